use chrono::NaiveDate;
use hs_correlate::{Confidence, CorrelateError, CorrelationEngine, FallbackLevel};
use hs_model::{CorrelationRecord, EdgeKind, EntryRecord, NomenclatureVersion, SectionRecord, VersionId};
use hs_standards::NomenclatureStore;
use proptest::prelude::*;

fn year(y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
}

fn entries(subheadings: &[&str]) -> Vec<EntryRecord> {
    let mut entries = vec![
        EntryRecord::new("84", "Machinery").in_section("XVI"),
        EntryRecord::new("8471", "Automatic data processing machines"),
        EntryRecord::new("8473", "Parts and accessories"),
    ];
    entries.extend(subheadings.iter().map(|code| EntryRecord::new(*code, "Subheading")));
    entries
}

fn edge(from: (&str, &str), to: (&str, &str), kind: EdgeKind, weight: f64) -> CorrelationRecord {
    CorrelationRecord::new(from, to, kind, weight)
}

fn v(id: &str) -> VersionId {
    VersionId::new(id)
}

fn store() -> NomenclatureStore {
    let store = NomenclatureStore::new();
    let sections = || {
        vec![SectionRecord {
            id: "XVI".to_string(),
            title: "Machinery".to_string(),
        }]
    };
    store
        .ingest_version(
            NomenclatureVersion::new("HS2012", year(2012)).until(year(2017)),
            sections(),
            entries(&["847130"]),
        )
        .unwrap();
    store
        .ingest_version(
            NomenclatureVersion::new("HS2017", year(2017)).until(year(2022)),
            sections(),
            entries(&["847130", "847150", "847160", "847310", "847330", "847390"]),
        )
        .unwrap();
    store
        .ingest_version(
            NomenclatureVersion::new("HS2022", year(2022)),
            sections(),
            entries(&["847130", "847151", "847152", "847340"]),
        )
        .unwrap();

    store
        .ingest_correlations(
            &v("HS2012"),
            &v("HS2017"),
            vec![edge(("HS2012", "847130"), ("HS2017", "847130"), EdgeKind::Exact, 1.0)],
        )
        .unwrap();
    let a = "HS2017";
    let b = "HS2022";
    store
        .ingest_correlations(
            &v(a),
            &v(b),
            vec![
                edge((a, "847130"), (b, "847130"), EdgeKind::Exact, 1.0),
                edge((a, "847150"), (b, "847151"), EdgeKind::Split, 0.6),
                edge((a, "847150"), (b, "847152"), EdgeKind::Split, 0.4),
                edge((a, "847160"), (b, "847151"), EdgeKind::Uncertain, 0.3),
                edge((a, "847160"), (b, "847152"), EdgeKind::Uncertain, 0.7),
                edge((a, "847310"), (b, "847340"), EdgeKind::Merge, 1.0),
                edge((a, "847330"), (b, "847340"), EdgeKind::Merge, 1.0),
                edge((a, "8473"), (b, "8473"), EdgeKind::Exact, 1.0),
            ],
        )
        .unwrap();
    store
}

#[test]
fn single_exact_edge() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("847130", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.target.as_deref(), Some("847130"));
    assert_eq!(conversion.confidence, Confidence::Exact);
    assert!(conversion.alternatives.is_empty());
    assert!(conversion.fallback.is_none());
}

#[test]
fn no_edge_and_no_heading_fallback() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("999999", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.target, None);
    assert_eq!(conversion.confidence, Confidence::NotFound);

    let json = serde_json::to_value(&conversion).unwrap();
    assert_eq!(json["confidence"], "not_found");
    assert!(json["target"].is_null());
}

#[test]
fn declared_split_is_preserved() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("8471.50", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.confidence, Confidence::Split);
    assert_eq!(conversion.target, None);
    let codes: Vec<&str> = conversion.alternatives.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["847151", "847152"]);
}

#[test]
fn multiple_targets_are_uncertain_and_ordered_by_weight() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("847160", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.confidence, Confidence::Uncertain);
    assert_eq!(conversion.target, None);
    let codes: Vec<&str> = conversion.alternatives.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["847152", "847151"]);
}

#[test]
fn merge_names_the_other_sources() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("847330", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.confidence, Confidence::Merge);
    assert_eq!(conversion.target.as_deref(), Some("847340"));
    assert_eq!(conversion.merged_with, vec!["847310".to_string()]);
}

#[test]
fn heading_fallback_caps_confidence() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("847390", &v("HS2017"), &v("HS2022")).unwrap();
    assert_eq!(conversion.target.as_deref(), Some("8473"));
    assert_eq!(conversion.confidence, Confidence::Probable);
    assert_eq!(conversion.fallback, Some(FallbackLevel::Heading));
}

#[test]
fn national_code_falls_back_to_subheading() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine
        .correlate("8471300100", &v("HS2017"), &v("HS2022"))
        .unwrap();
    assert_eq!(conversion.target.as_deref(), Some("847130"));
    assert_eq!(conversion.confidence, Confidence::Probable);
    assert_eq!(conversion.fallback, Some(FallbackLevel::Subheading));
}

#[test]
fn chains_tables_when_no_direct_table_exists() {
    let engine = CorrelationEngine::from_store(&store());
    let conversion = engine.correlate("847130", &v("HS2012"), &v("HS2022")).unwrap();
    assert_eq!(conversion.target.as_deref(), Some("847130"));
    assert_eq!(conversion.confidence, Confidence::Exact);
    assert_eq!(conversion.via, vec![v("HS2017")]);
}

#[test]
fn split_rejoined_by_a_later_merge_still_names_its_target() {
    let store = NomenclatureStore::new();
    let sections = || {
        vec![SectionRecord {
            id: "XVI".to_string(),
            title: "Machinery".to_string(),
        }]
    };
    let versions = [
        ("HS2012", year(2012), Some(year(2017)), vec!["847130"]),
        ("HS2017", year(2017), Some(year(2022)), vec!["847131", "847132"]),
        ("HS2022", year(2022), None, vec!["847140"]),
    ];
    for (id, from, to, subheadings) in versions {
        let mut version = NomenclatureVersion::new(id, from);
        if let Some(to) = to {
            version = version.until(to);
        }
        store
            .ingest_version(version, sections(), entries(&subheadings))
            .unwrap();
    }
    store
        .ingest_correlations(
            &v("HS2012"),
            &v("HS2017"),
            vec![
                edge(("HS2012", "847130"), ("HS2017", "847131"), EdgeKind::Split, 0.6),
                edge(("HS2012", "847130"), ("HS2017", "847132"), EdgeKind::Split, 0.4),
            ],
        )
        .unwrap();
    store
        .ingest_correlations(
            &v("HS2017"),
            &v("HS2022"),
            vec![
                edge(("HS2017", "847131"), ("HS2022", "847140"), EdgeKind::Merge, 1.0),
                edge(("HS2017", "847132"), ("HS2022", "847140"), EdgeKind::Merge, 1.0),
            ],
        )
        .unwrap();

    let engine = CorrelationEngine::from_store(&store);
    let conversion = engine.correlate("847130", &v("HS2012"), &v("HS2022")).unwrap();
    assert_eq!(conversion.confidence, Confidence::Split);
    assert_eq!(conversion.target, None);
    let codes: Vec<&str> = conversion.alternatives.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["847140"]);
    assert_eq!(conversion.via, vec![v("HS2017")]);
    assert_eq!(conversion.merged_with, vec!["847131".to_string(), "847132".to_string()]);
}

#[test]
fn edges_are_directed() {
    let engine = CorrelationEngine::from_store(&store());
    let err = engine
        .correlate("847130", &v("HS2022"), &v("HS2017"))
        .unwrap_err();
    assert_eq!(
        err,
        CorrelateError::NoCorrelationPath {
            from: v("HS2022"),
            to: v("HS2017"),
        }
    );
}

#[test]
fn caller_errors() {
    let engine = CorrelationEngine::from_store(&store());
    assert!(matches!(
        engine.correlate("847130", &v("HS2017"), &v("HS2028")),
        Err(CorrelateError::VersionUnsupported { .. })
    ));
    assert!(matches!(
        engine.correlate("84713A", &v("HS2017"), &v("HS2022")),
        Err(CorrelateError::InvalidFormat { .. })
    ));
}

#[test]
fn batch_keeps_input_order() {
    let engine = CorrelationEngine::from_store(&store());
    let results = engine.correlate_batch(["847130", "bad", "847150"], &v("HS2017"), &v("HS2022"));
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().confidence, Confidence::Exact);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().confidence, Confidence::Split);
}

proptest! {
    #[test]
    fn same_version_is_identity(raw in "[0-9]{6,12}", version in prop::sample::select(vec!["HS2012", "HS2017", "HS2022"])) {
        let engine = CorrelationEngine::from_store(&store());
        let conversion = engine.correlate(&raw, &v(version), &v(version)).unwrap();
        prop_assert_eq!(conversion.confidence, Confidence::Exact);
        prop_assert_eq!(conversion.target, Some(raw));
    }

    #[test]
    fn split_is_never_exact(suffix in "[0-9]{0,4}") {
        let engine = CorrelationEngine::from_store(&store());
        let raw = format!("847150{suffix}");
        let conversion = engine.correlate(&raw, &v("HS2017"), &v("HS2022")).unwrap();
        prop_assert_eq!(conversion.confidence, Confidence::Split);
        prop_assert!(conversion.alternatives.len() >= 2);
        prop_assert!(conversion.target.is_none());
    }
}
