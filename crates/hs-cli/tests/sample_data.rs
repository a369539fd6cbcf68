//! The bundled `data/` directory must stay loadable.

use std::path::PathBuf;

use hs_cli::commands::{Session, run_correlate, run_lookup};
use hs_correlate::Confidence;

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn sample_dataset_verifies() {
    let session = Session::open(Some(&sample_dir())).unwrap();
    let current = session.snapshot().current().unwrap();
    assert_eq!(current.id().as_str(), "HS2022");

    let smartphones = run_lookup(&session, "8517.13", None, None).unwrap();
    assert_eq!(smartphones.entry.description, "Smartphones");

    let conversions =
        run_correlate(&session, &["851712".to_string()], "HS2017", "HS2022").unwrap();
    assert_eq!(conversions[0].confidence, Confidence::Split);
    let targets: Vec<&str> = conversions[0]
        .alternatives
        .iter()
        .map(|alt| alt.code.as_str())
        .collect();
    assert_eq!(targets, vec!["851713", "851714"]);
}
