use std::collections::BTreeMap;
use std::sync::Arc;

use hs_model::{
    Alternative, Confidence, Conversion, EdgeKind, FallbackLevel, VersionId, normalize_digits,
};
use hs_standards::{CorrelationTable, NomenclatureStore, Snapshot};
use tracing::debug;

use crate::error::{CorrelateError, Result};
use crate::path::table_chain;

/// Projects codes between versions of one store snapshot.
#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    snapshot: Arc<Snapshot>,
}

/// Outcome of following one or more tables, before it becomes a
/// [`Conversion`].
#[derive(Debug, Clone)]
struct Projection {
    targets: Vec<Alternative>,
    confidence: Confidence,
    fallback: Option<FallbackLevel>,
    merged_with: Vec<String>,
}

impl Projection {
    fn not_found() -> Self {
        Self {
            targets: Vec::new(),
            confidence: Confidence::NotFound,
            fallback: None,
            merged_with: Vec::new(),
        }
    }

    fn single_target(&self) -> Option<&str> {
        match self.targets.as_slice() {
            [only] if self.confidence != Confidence::Split => Some(only.code.as_str()),
            _ => None,
        }
    }
}

impl CorrelationEngine {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn from_store(store: &NomenclatureStore) -> Self {
        Self::new(store.snapshot())
    }

    /// Project `code` from version `from` onto version `to`.
    ///
    /// # Errors
    ///
    /// [`CorrelateError::InvalidFormat`] for non-numeric input,
    /// [`CorrelateError::VersionUnsupported`] when either version is not
    /// loaded, and [`CorrelateError::NoCorrelationPath`] when no chain of
    /// tables leads from `from` to `to`. A code without edges is not an
    /// error: it yields [`Confidence::NotFound`].
    pub fn correlate(&self, code: &str, from: &VersionId, to: &VersionId) -> Result<Conversion> {
        let digits = normalize_digits(code).map_err(|_| CorrelateError::InvalidFormat {
            raw: code.to_string(),
        })?;
        for version in [from, to] {
            self.snapshot
                .version(version)
                .map_err(|_| CorrelateError::VersionUnsupported {
                    version: version.clone(),
                })?;
        }
        if from == to {
            return Ok(Conversion::identity(digits, from.clone()));
        }

        let chain =
            table_chain(&self.snapshot, from, to).ok_or_else(|| CorrelateError::NoCorrelationPath {
                from: from.clone(),
                to: to.clone(),
            })?;
        let projection = project_chain(&digits, &chain);

        let mut conversion = Conversion::not_found(digits, from.clone(), to.clone());
        conversion.via = chain
            .iter()
            .take(chain.len().saturating_sub(1))
            .map(|table| table.to().clone())
            .collect();
        if projection.confidence == Confidence::NotFound {
            return Ok(conversion);
        }
        conversion.target = projection.single_target().map(str::to_string);
        // A split lists its targets even when a later merge rejoins them.
        conversion.alternatives = if projection.targets.len() > 1
            || projection.confidence == Confidence::Split
        {
            projection.targets
        } else {
            Vec::new()
        };
        conversion.confidence = projection.confidence;
        conversion.fallback = projection.fallback;
        conversion.merged_with = projection.merged_with;
        Ok(conversion)
    }

    /// [`CorrelationEngine::correlate`] for each input, in input order.
    pub fn correlate_batch<I, S>(
        &self,
        codes: I,
        from: &VersionId,
        to: &VersionId,
    ) -> Vec<Result<Conversion>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .map(|code| self.correlate(code.as_ref(), from, to))
            .collect()
    }
}

fn project_chain(digits: &str, chain: &[&CorrelationTable]) -> Projection {
    let Some((first, rest)) = chain.split_first() else {
        return Projection::not_found();
    };
    let head = project(first, digits);
    if rest.is_empty() || head.confidence == Confidence::NotFound {
        return head;
    }

    let mut confidence = head.confidence;
    let mut fallback = head.fallback;
    let mut merged_with = head.merged_with.clone();
    let mut targets: BTreeMap<String, Alternative> = BTreeMap::new();
    let unambiguous_head = head.targets.len() == 1;

    for step in &head.targets {
        let next = project_chain(&step.code, rest);
        if next.confidence == Confidence::NotFound {
            continue;
        }
        confidence = dominant(confidence, next.confidence);
        fallback = fallback.or(next.fallback);
        merged_with.extend(next.merged_with);
        for target in next.targets {
            let weight = if unambiguous_head {
                target.weight
            } else {
                step.weight * target.weight
            };
            targets
                .entry(target.code.clone())
                .and_modify(|existing| existing.weight = existing.weight.max(weight))
                .or_insert(Alternative { weight, ..target });
        }
    }
    if targets.is_empty() {
        return Projection::not_found();
    }

    let mut targets: Vec<Alternative> = targets.into_values().collect();
    sort_alternatives(&mut targets);
    if targets.len() > 1 && !confidence.is_structural() {
        confidence = Confidence::Uncertain;
    }
    if fallback.is_some() {
        confidence = confidence.capped_at_probable();
    }
    merged_with.sort();
    merged_with.dedup();
    Projection {
        targets,
        confidence,
        fallback,
        merged_with,
    }
}

/// Follow one table, falling back to coarser granularity when the full code
/// has no edges.
fn project(table: &CorrelationTable, digits: &str) -> Projection {
    let mut candidates = vec![(digits, None)];
    if digits.len() > 6 {
        candidates.push((&digits[..6], Some(FallbackLevel::Subheading)));
    }
    if digits.len() > 4 {
        candidates.push((&digits[..4], Some(FallbackLevel::Heading)));
    }

    let Some((key, fallback, edges)) = candidates.into_iter().find_map(|(key, fallback)| {
        let edges = table.edges_for(key);
        (!edges.is_empty()).then_some((key, fallback, edges))
    }) else {
        debug!(code = digits, from = %table.from(), to = %table.to(), "no correlation edges");
        return Projection::not_found();
    };
    if let Some(level) = fallback {
        debug!(code = digits, matched = key, ?level, "correlation fell back to coarser code");
    }

    let mut confidence = if edges.iter().any(|e| e.kind == EdgeKind::Split) {
        Confidence::Split
    } else if edges.iter().any(|e| e.kind == EdgeKind::Merge) {
        Confidence::Merge
    } else if let [only] = edges {
        Confidence::from(only.kind)
    } else {
        Confidence::Uncertain
    };
    if fallback.is_some() {
        confidence = confidence.capped_at_probable();
    }

    let merged_with = edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Merge)
        .flat_map(|e| table.merge_sources(&e.code))
        .filter(|source| source.as_str() != key)
        .cloned()
        .collect();

    Projection {
        targets: edges.to_vec(),
        confidence,
        fallback,
        merged_with,
    }
}

/// Structural kinds dominate, then the weaker heuristic confidence.
fn dominant(a: Confidence, b: Confidence) -> Confidence {
    fn rank(c: Confidence) -> u8 {
        match c {
            Confidence::Exact => 0,
            Confidence::Probable => 1,
            Confidence::Uncertain => 2,
            Confidence::Merge => 3,
            Confidence::Split => 4,
            Confidence::NotFound => 5,
        }
    }
    if rank(a) >= rank(b) { a } else { b }
}

fn sort_alternatives(alternatives: &mut [Alternative]) {
    alternatives.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.code.cmp(&b.code))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_outranks_merge_and_heuristics() {
        assert_eq!(dominant(Confidence::Exact, Confidence::Split), Confidence::Split);
        assert_eq!(dominant(Confidence::Merge, Confidence::Uncertain), Confidence::Merge);
        assert_eq!(dominant(Confidence::Probable, Confidence::Exact), Confidence::Probable);
    }

    #[test]
    fn alternatives_sort_by_weight_then_code() {
        let mut alternatives = vec![
            Alternative {
                code: "847152".to_string(),
                weight: 0.5,
                kind: EdgeKind::Uncertain,
            },
            Alternative {
                code: "847151".to_string(),
                weight: 0.5,
                kind: EdgeKind::Uncertain,
            },
            Alternative {
                code: "847160".to_string(),
                weight: 0.9,
                kind: EdgeKind::Uncertain,
            },
        ];
        sort_alternatives(&mut alternatives);
        let codes: Vec<&str> = alternatives.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["847160", "847151", "847152"]);
    }
}
