//! Shortest chain of directed tables between two versions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hs_model::VersionId;
use hs_standards::{CorrelationTable, Snapshot};

/// Tables to apply in order to get from `from` to `to`.
///
/// Breadth-first over tables in version order, so the shortest chain wins
/// and ties resolve the same way on every call. `None` when no chain exists.
pub(crate) fn table_chain<'a>(
    snapshot: &'a Snapshot,
    from: &VersionId,
    to: &VersionId,
) -> Option<Vec<&'a CorrelationTable>> {
    if let Some(direct) = snapshot.correlation(from, to) {
        return Some(vec![direct]);
    }

    let mut reached_by: BTreeMap<VersionId, &'a CorrelationTable> = BTreeMap::new();
    let mut visited: BTreeSet<VersionId> = BTreeSet::from([from.clone()]);
    let mut queue = VecDeque::from([from.clone()]);

    while let Some(version) = queue.pop_front() {
        for table in snapshot.correlations_from(&version) {
            if !visited.insert(table.to().clone()) {
                continue;
            }
            reached_by.insert(table.to().clone(), table);
            if table.to() == to {
                return Some(unwind(&reached_by, from, to));
            }
            queue.push_back(table.to().clone());
        }
    }
    None
}

fn unwind<'a>(
    reached_by: &BTreeMap<VersionId, &'a CorrelationTable>,
    from: &VersionId,
    to: &VersionId,
) -> Vec<&'a CorrelationTable> {
    let mut chain = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let Some(table) = reached_by.get(cursor) else {
            break;
        };
        chain.push(*table);
        cursor = table.from();
    }
    chain.reverse();
    chain
}
