//! Directed correlation tables between two loaded versions.

use std::collections::{BTreeMap, BTreeSet};

use hs_model::{Alternative, CorrelationRecord, EdgeKind, VersionId, normalize_digits};
use tracing::info;

use crate::error::{Result, StandardsError};
use crate::registry::Registry;

/// Edges from one version to another, keyed by source code.
///
/// Built against both registries so every edge endpoint is a registered code.
#[derive(Debug, Clone)]
pub struct CorrelationTable {
    from: VersionId,
    to: VersionId,
    /// Source code -> targets, sorted by weight descending then code.
    edges: BTreeMap<String, Vec<Alternative>>,
    /// Target code -> sources that declare a merge into it.
    merges: BTreeMap<String, Vec<String>>,
}

impl CorrelationTable {
    /// Build the `from -> to` table.
    ///
    /// # Errors
    ///
    /// [`StandardsError::Structural`] when a record belongs to another
    /// version pair, names an unregistered code, carries an invalid weight,
    /// repeats an edge, or declares a split with one target or a merge with
    /// one source.
    pub fn load<R>(from: &Registry, to: &Registry, records: R) -> Result<Self>
    where
        R: IntoIterator<Item = CorrelationRecord>,
    {
        let from_version = from.version().clone();
        let to_version = to.version().clone();
        let mut edges: BTreeMap<String, Vec<Alternative>> = BTreeMap::new();
        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();

        for record in records {
            if record.from_version != from_version || record.to_version != to_version {
                return Err(StandardsError::structural(
                    &from_version,
                    &record.from_code,
                    format!(
                        "edge {} -> {} does not belong to table {from_version} -> {to_version}",
                        record.from_version, record.to_version
                    ),
                ));
            }
            let from_code = registered(from, &record.from_code)?;
            let to_code = registered(to, &record.to_code)?;
            if !record.weight.is_finite() || record.weight < 0.0 {
                return Err(StandardsError::structural(
                    &from_version,
                    &from_code,
                    format!("weight {} must be a finite non-negative number", record.weight),
                ));
            }
            if !seen.insert((from_code.clone(), to_code.clone())) {
                return Err(StandardsError::structural(
                    &from_version,
                    &from_code,
                    format!("duplicate edge to {to_code}"),
                ));
            }
            edges.entry(from_code).or_default().push(Alternative {
                code: to_code,
                weight: record.weight,
                kind: record.kind,
            });
        }

        let mut merges: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (source, targets) in &mut edges {
            targets.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.code.cmp(&b.code)));
            let splits = targets.iter().filter(|t| t.kind == EdgeKind::Split).count();
            if splits > 0 && targets.len() < 2 {
                return Err(StandardsError::structural(
                    &from_version,
                    source,
                    "split declares a single target",
                ));
            }
            for target in targets.iter().filter(|t| t.kind == EdgeKind::Merge) {
                merges
                    .entry(target.code.clone())
                    .or_default()
                    .push(source.clone());
            }
        }
        for (target, sources) in &merges {
            if sources.len() < 2 {
                return Err(StandardsError::structural(
                    &to_version,
                    target,
                    "merge declares a single source",
                ));
            }
        }

        info!(
            from = %from_version,
            to = %to_version,
            sources = edges.len(),
            "correlation table loaded"
        );
        Ok(Self {
            from: from_version,
            to: to_version,
            edges,
            merges,
        })
    }

    pub fn from(&self) -> &VersionId {
        &self.from
    }

    pub fn to(&self) -> &VersionId {
        &self.to
    }

    /// Number of source codes with at least one edge.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Targets of `code`, best first. Empty when the table has no edge.
    pub fn edges_for(&self, code: &str) -> &[Alternative] {
        normalize_digits(code)
            .ok()
            .and_then(|key| self.edges.get(&key))
            .map_or(&[], Vec::as_slice)
    }

    /// Every source declaring a merge into `target`, ascending.
    pub fn merge_sources(&self, target: &str) -> &[String] {
        self.merges.get(target).map_or(&[], Vec::as_slice)
    }
}

fn registered(registry: &Registry, code: &str) -> Result<String> {
    let entry = registry.lookup(code).map_err(|_| {
        StandardsError::structural(
            registry.version(),
            code,
            "correlation endpoint is not registered",
        )
    })?;
    Ok(entry.code.clone())
}

#[cfg(test)]
mod tests {
    use hs_model::{EntryRecord, SectionRecord};

    use super::*;

    fn registry(version: &str, subheadings: &[&str]) -> Registry {
        let mut entries = vec![
            EntryRecord::new("84", "Machinery").in_section("XVI"),
            EntryRecord::new("8471", "Computers"),
        ];
        entries.extend(subheadings.iter().map(|c| EntryRecord::new(*c, "Sub")));
        Registry::load(
            version,
            vec![SectionRecord {
                id: "XVI".to_string(),
                title: "Machinery".to_string(),
            }],
            entries,
        )
        .unwrap()
    }

    fn edge(from: &str, to: &str, kind: EdgeKind, weight: f64) -> CorrelationRecord {
        CorrelationRecord::new(("HS2017", from), ("HS2022", to), kind, weight)
    }

    #[test]
    fn sorts_targets_by_weight_then_code() {
        let old = registry("HS2017", &["847130"]);
        let new = registry("HS2022", &["847131", "847132", "847133"]);
        let table = CorrelationTable::load(
            &old,
            &new,
            vec![
                edge("847130", "847133", EdgeKind::Split, 0.2),
                edge("847130", "847131", EdgeKind::Split, 0.5),
                edge("847130", "847132", EdgeKind::Split, 0.5),
            ],
        )
        .unwrap();
        let codes: Vec<&str> = table
            .edges_for("8471.30")
            .iter()
            .map(|a| a.code.as_str())
            .collect();
        assert_eq!(codes, vec!["847131", "847132", "847133"]);
        assert!(table.edges_for("847199").is_empty());
    }

    #[test]
    fn split_needs_two_targets() {
        let old = registry("HS2017", &["847130"]);
        let new = registry("HS2022", &["847131"]);
        let err = CorrelationTable::load(&old, &new, vec![edge("847130", "847131", EdgeKind::Split, 1.0)])
            .unwrap_err();
        assert!(err.to_string().contains("split declares a single target"));
    }

    #[test]
    fn merge_needs_two_sources() {
        let old = registry("HS2017", &["847130", "847140"]);
        let new = registry("HS2022", &["847150"]);
        let err = CorrelationTable::load(&old, &new, vec![edge("847130", "847150", EdgeKind::Merge, 1.0)])
            .unwrap_err();
        assert!(err.to_string().contains("merge declares a single source"));

        let table = CorrelationTable::load(
            &old,
            &new,
            vec![
                edge("847130", "847150", EdgeKind::Merge, 1.0),
                edge("847140", "847150", EdgeKind::Merge, 1.0),
            ],
        )
        .unwrap();
        assert_eq!(table.merge_sources("847150"), ["847130", "847140"]);
    }

    #[test]
    fn rejects_unregistered_endpoints_and_bad_weights() {
        let old = registry("HS2017", &["847130"]);
        let new = registry("HS2022", &["847130"]);
        assert!(
            CorrelationTable::load(&old, &new, vec![edge("847199", "847130", EdgeKind::Exact, 1.0)])
                .is_err()
        );
        assert!(
            CorrelationTable::load(
                &old,
                &new,
                vec![edge("847130", "847130", EdgeKind::Exact, f64::NAN)]
            )
            .is_err()
        );
        let reversed = CorrelationRecord::new(("HS2022", "847130"), ("HS2017", "847130"), EdgeKind::Exact, 1.0);
        assert!(CorrelationTable::load(&old, &new, vec![reversed]).is_err());
    }
}
