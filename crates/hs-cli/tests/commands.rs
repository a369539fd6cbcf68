//! End-to-end command tests over a verified temporary dataset.

use std::fs;
use std::path::Path;

use comfy_table::presets::ASCII_MARKDOWN;
use hs_cli::commands::{
    Session, ValidateRequest, run_ancestors, run_children, run_correlate, run_doctor, run_lookup,
    run_search, run_validate, run_versions,
};
use hs_cli::summary;
use hs_correlate::Confidence;
use hs_search::{SearchMode, SearchOptions};
use hs_standards::hash::sha256_hex;

const SECTIONS: &str = "Section,Title\nXVI,Machinery and mechanical appliances\n";

const HS2017: &str = "Code,Description,Parent Chapter,Parent Heading,Section,Notes\n\
84,\"Nuclear reactors, boilers, machinery\",,,XVI,\n\
8471,Automatic data processing machines,84,,,\n\
847130,\"Portable machines, weighing not more than 10 kg\",84,8471,,\n\
847150,Processing units,84,8471,,\n";

const HS2022: &str = "Code,Description,Parent Chapter,Parent Heading,Section,Notes\n\
84,\"Nuclear reactors, boilers, machinery\",,,XVI,\n\
8471,Automatic data processing machines,84,,,\n\
847130,\"Portable machines, weighing not more than 10 kg\",84,8471,,\n\
847151,Processing units for servers,84,8471,,\n\
847152,Processing units for workstations,84,8471,,\n";

const US2022: &str = "Code,Description,Notes\n8471300100,Tablets,\n";

const CORRELATION: &str = "From Version,From Code,To Version,To Code,Confidence,Weight\n\
HS2017,847130,HS2022,847130,exact,1\n\
HS2017,847150,HS2022,847151,split,0.6\n\
HS2017,847150,HS2022,847152,split,0.4\n";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn file_entry(root: &Path, rel: &str, role: &str, extra: &str) -> String {
    let sha = sha256_hex(&fs::read(root.join(rel)).unwrap());
    format!(
        "[[files]]\npath = \"{rel}\"\nsha256 = \"{sha}\"\nkind = \"csv\"\nrole = \"{role}\"\n{extra}\n"
    )
}

fn write_dataset(root: &Path) {
    let files = [
        ("sections.csv", SECTIONS, "sections", ""),
        (
            "HS2017/nomenclature.csv",
            HS2017,
            "nomenclature",
            "version = \"HS2017\"",
        ),
        (
            "HS2022/nomenclature.csv",
            HS2022,
            "nomenclature",
            "version = \"HS2022\"",
        ),
        (
            "HS2022/national/US.csv",
            US2022,
            "national",
            "version = \"HS2022\"\njurisdiction = \"US\"",
        ),
        (
            "correlations/HS2017_HS2022.csv",
            CORRELATION,
            "correlation",
            "from = \"HS2017\"\nto = \"HS2022\"",
        ),
    ];
    let mut manifest = String::from(
        "[manifest]\nschema = \"hs-codes.dataset-manifest\"\nschema_version = 1\n\n\
         [[versions]]\nid = \"HS2017\"\neffective_from = \"2017-01-01\"\neffective_to = \"2022-01-01\"\n\n\
         [[versions]]\nid = \"HS2022\"\nlabel = \"HS 2022 Edition\"\neffective_from = \"2022-01-01\"\ncurrent = true\n\n",
    );
    for (rel, contents, role, extra) in files {
        write(root, rel, contents);
        manifest.push_str(&file_entry(root, rel, role, extra));
    }
    write(root, "manifest.toml", &manifest);
}

fn session() -> (tempfile::TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let session = Session::open(Some(dir.path())).unwrap();
    (dir, session)
}

fn codes(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

#[test]
fn validation_table_renders_each_verdict() {
    let (_dir, session) = session();
    let request = ValidateRequest {
        check_existence: true,
        ..ValidateRequest::default()
    };
    let report = run_validate(
        &session,
        &codes(&["8471.30", "84713A", "8471300100"]),
        &request,
    );
    assert!(report.has_errors());

    let mut table = summary::validation_table(&report);
    table.force_no_tty().load_preset(ASCII_MARKDOWN);
    insta::assert_snapshot!(table.to_string(), @r"
    | Input      | Code       | Level      | Status           | Findings                              |
    |------------|------------|------------|------------------|---------------------------------------|
    | 8471.30    | 847130     | subheading | valid            | -                                     |
    | 84713A     | -          | -          | invalid          | contains characters other than digits |
    | 8471300100 | 8471300100 | national   | valid (warnings) | longer than the usual tariff line     |
    ");
    insta::assert_snapshot!(
        summary::validation_footer(&report),
        @"3 checked, 2 valid, 1 invalid, 1 with warnings"
    );
}

#[test]
fn validate_checks_jurisdiction_and_existence() {
    let (_dir, session) = session();
    let request = ValidateRequest {
        jurisdiction: Some("us"),
        check_existence: true,
        ..ValidateRequest::default()
    };
    let report = run_validate(&session, &codes(&["8471300100", "8471300200"]), &request);
    assert!(report.results[0].valid);
    assert!(!report.results[1].valid);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["invalid"], 1);
    assert_eq!(json["results"][1]["errors"][0], "NotFound");

    let format_only = ValidateRequest::default();
    let report = run_validate(&session, &codes(&["847199"]), &format_only);
    assert!(!report.has_errors());
}

#[test]
fn lookup_reports_section_and_ancestors() {
    let (_dir, session) = session();
    let report = run_lookup(&session, "8471.30", None, None).unwrap();
    assert_eq!(report.version.as_str(), "HS2022");
    assert_eq!(report.entry.code, "847130");
    assert_eq!(report.section.as_ref().map(|s| s.id.as_str()), Some("XVI"));
    let ancestors: Vec<&str> = report.ancestors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(ancestors, vec!["84", "8471"]);

    let national = run_lookup(&session, "8471300100", None, Some("us")).unwrap();
    assert_eq!(national.entry.description, "Tablets");
    assert_eq!(national.ancestors.len(), 3);

    let err = run_lookup(&session, "847199", None, None).unwrap_err();
    assert!(format!("{err:#}").contains("look up 847199"));
}

#[test]
fn children_and_ancestors_follow_the_tree() {
    let (_dir, session) = session();
    let children = run_children(&session, "8471", None).unwrap();
    let child_codes: Vec<&str> = children.entries.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(child_codes, vec!["847130", "847151", "847152"]);

    let older = run_children(&session, "8471", Some("HS2017")).unwrap();
    assert_eq!(older.entries.len(), 2);

    let ancestors = run_ancestors(&session, "8471.52", None).unwrap();
    let ancestor_codes: Vec<&str> = ancestors.entries.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(ancestor_codes, vec!["84", "8471", "847152"]);

    assert!(run_children(&session, "84", Some("HS1996")).is_err());
}

#[test]
fn correlate_reports_splits() {
    let (_dir, session) = session();
    let conversions =
        run_correlate(&session, &codes(&["847130", "847150"]), "HS2017", "HS2022").unwrap();
    assert_eq!(conversions[0].confidence, Confidence::Exact);
    assert_eq!(conversions[1].confidence, Confidence::Split);

    let rendered = summary::conversion_table(&conversions).to_string();
    assert!(rendered.contains("847151 (0.60)"));
    assert!(rendered.contains("split"));

    let err = run_correlate(&session, &codes(&["84AB"]), "HS2017", "HS2022").unwrap_err();
    assert!(format!("{err:#}").contains("correlate 84AB"));
}

#[test]
fn search_defaults_to_current_version() {
    let (_dir, session) = session();
    let options = SearchOptions {
        mode: SearchMode::Exact,
        ..SearchOptions::default()
    };
    let report = run_search(&session, "processing units", options).unwrap();
    assert_eq!(report.version.as_str(), "HS2022");
    let hits: Vec<&str> = report.hits.iter().map(|h| h.code.as_str()).collect();
    assert_eq!(hits, vec!["847151", "847152"]);
}

#[test]
fn versions_and_doctor_summarize_the_dataset() {
    let (_dir, session) = session();
    let versions = run_versions(&session);
    assert_eq!(versions.len(), 2);
    assert!(versions[1].pinned);
    assert!(summary::versions_table(&versions).to_string().contains("HS2022 *"));

    let report = run_doctor(&session);
    assert_eq!(report.files.len(), 5);
    insta::assert_snapshot!(
        summary::doctor_footer(&report),
        @"5 files verified: 2 versions, 1 jurisdictions, 5 subheadings, 1 correlation tables"
    );
}

#[test]
fn open_reports_the_dataset_directory() {
    let dir = tempfile::tempdir().unwrap();
    let Err(err) = Session::open(Some(dir.path())) else {
        panic!("empty directory must not load");
    };
    assert!(format!("{err:#}").contains("load dataset from"));
}
