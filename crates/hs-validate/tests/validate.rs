use chrono::NaiveDate;
use hs_model::{Code, EntryRecord, NomenclatureVersion, SectionRecord, is_valid_chapter};
use hs_standards::NomenclatureStore;
use hs_validate::{ErrorKind, ValidateOptions, Validator, WarningKind};
use proptest::prelude::*;

fn store() -> NomenclatureStore {
    let store = NomenclatureStore::new();
    store
        .ingest_version(
            NomenclatureVersion::new("HS2022", NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()),
            vec![SectionRecord {
                id: "XVI".to_string(),
                title: "Machinery".to_string(),
            }],
            vec![
                EntryRecord::new("84", "Machinery").in_section("XVI"),
                EntryRecord::new("8471", "Automatic data processing machines"),
                EntryRecord::new("847130", "Portable machines"),
            ],
        )
        .unwrap();
    store
        .ingest_jurisdiction(
            &"HS2022".into(),
            "US",
            vec![EntryRecord::new("8471300100", "Tablets")],
        )
        .unwrap();
    store
}

#[test]
fn six_digit_code_passes_format_checks() {
    let validator = Validator::from_store(&NomenclatureStore::new());
    let result = validator.validate("847130", &ValidateOptions::for_version("HS2022").format_only());
    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn letters_are_invalid_format() {
    let validator = Validator::from_store(&store());
    let result = validator.validate("84713A", &ValidateOptions::default());
    assert!(!result.valid);
    assert_eq!(result.errors, vec![ErrorKind::InvalidFormat]);
    assert!(result.warnings.is_empty());
    assert!(result.code.is_none());
}

#[test]
fn ten_digits_warn_without_failing() {
    let validator = Validator::from_store(&NomenclatureStore::new());
    let result = validator.validate(
        "8471300000",
        &ValidateOptions::for_version("HS2022").format_only(),
    );
    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings, vec![WarningKind::UnusualLength]);
}

#[test]
fn warning_only_code_keeps_verdict_through_display() {
    let validator = Validator::from_store(&store());
    let options = ValidateOptions::for_version("HS2022");
    let first = validator.validate("8471300000", &options);
    let formatted = first.code.as_ref().unwrap().to_string();
    let second = validator.validate(&formatted, &options);
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn format_failures_short_circuit() {
    let validator = Validator::from_store(&store());
    let options = ValidateOptions::default();
    assert_eq!(
        validator.validate("8471", &options).errors,
        vec![ErrorKind::TooShort]
    );
    assert_eq!(
        validator.validate("8471300000000", &options).errors,
        vec![ErrorKind::TooLong]
    );
    assert_eq!(
        validator.validate("990130", &options).errors,
        vec![ErrorKind::InvalidChapter]
    );
}

#[test]
fn existence_is_checked_against_the_version() {
    let validator = Validator::from_store(&store());
    let options = ValidateOptions::for_version("HS2022");
    assert!(validator.validate("8471.30", &options).valid);
    assert_eq!(
        validator.validate("847150", &options).errors,
        vec![ErrorKind::NotFound]
    );
    // Headings are not leaves.
    assert_eq!(
        validator.validate("847100", &options).errors,
        vec![ErrorKind::NotFound]
    );
}

#[test]
fn default_options_use_the_current_version() {
    let store = store();
    store.set_current(&"HS2022".into()).unwrap();
    let validator = Validator::from_store(&store);
    let result = validator.validate("847130", &ValidateOptions::default());
    assert!(result.valid);
    assert_eq!(
        result.code.map(|c| c.version().to_string()),
        Some("HS2022".to_string())
    );
}

#[test]
fn unloaded_version_is_unsupported() {
    let validator = Validator::from_store(&store());
    let result = validator.validate("847130", &ValidateOptions::for_version("HS2028"));
    assert_eq!(result.errors, vec![ErrorKind::VersionUnsupported]);

    let format_only = ValidateOptions::for_version("HS2028").format_only();
    assert!(validator.validate("847130", &format_only).valid);
}

#[test]
fn format_only_needs_no_current_version() {
    let options = ValidateOptions::default().format_only();
    assert_eq!(options.version, None);

    let empty = Validator::from_store(&NomenclatureStore::new());
    let result = empty.validate("847130", &options);
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.errors.is_empty());

    let warned = empty.validate("8471300000", &options);
    assert!(warned.valid);
    assert_eq!(warned.warnings, vec![WarningKind::UnusualLength]);
    assert_eq!(
        empty.validate("84713A", &options).errors,
        vec![ErrorKind::InvalidFormat]
    );

    // Only HS2017 is loaded and it is no longer in force.
    let expired = NomenclatureStore::new();
    expired
        .ingest_version(
            NomenclatureVersion::new("HS2017", NaiveDate::from_ymd_opt(2017, 1, 1).unwrap())
                .until(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()),
            vec![SectionRecord {
                id: "XVI".to_string(),
                title: "Machinery".to_string(),
            }],
            vec![
                EntryRecord::new("84", "Machinery").in_section("XVI"),
                EntryRecord::new("8471", "Automatic data processing machines"),
                EntryRecord::new("847130", "Portable machines"),
            ],
        )
        .unwrap();
    let validator = Validator::from_store(&expired);
    assert!(validator.validate("847130", &options).valid);

    // Registry checks still need a resolvable version.
    assert_eq!(
        validator.validate("847130", &ValidateOptions::default()).errors,
        vec![ErrorKind::VersionUnsupported]
    );
    let us = ValidateOptions::default().format_only().in_jurisdiction("US");
    assert_eq!(
        empty.validate("8471300100", &us).errors,
        vec![ErrorKind::VersionUnsupported]
    );
    assert!(empty.validate("847130", &us).valid);
}

#[test]
fn jurisdiction_lines() {
    let validator = Validator::from_store(&store());
    let us = ValidateOptions::for_version("HS2022").in_jurisdiction("us");
    assert!(validator.validate("8471.30.01.00", &us).valid);
    assert_eq!(
        validator.validate("8471300200", &us).errors,
        vec![ErrorKind::NotFound]
    );

    let eu = ValidateOptions::for_version("HS2022").in_jurisdiction("EU");
    assert_eq!(
        validator.validate("8471300100", &eu).errors,
        vec![ErrorKind::JurisdictionUnsupported]
    );
    // No extension digits, so the missing registry does not matter.
    assert!(validator.validate("847130", &eu).valid);
}

#[test]
fn batch_keeps_input_order() {
    let validator = Validator::from_store(&store());
    let results = validator.validate_batch(
        ["847130", "84713A", "847150"],
        &ValidateOptions::for_version("HS2022"),
    );
    let verdicts: Vec<(&str, bool)> = results
        .iter()
        .map(|r| (r.input.as_str(), r.valid))
        .collect();
    assert_eq!(
        verdicts,
        vec![("847130", true), ("84713A", false), ("847150", false)]
    );
}

fn valid_six_digit() -> impl Strategy<Value = String> {
    (1u8..=97, 0u32..10_000)
        .prop_map(|(chapter, rest)| format!("{chapter:02}{rest:04}"))
        .prop_filter("reserved chapter", |raw| is_valid_chapter(&raw[..2]))
}

proptest! {
    #[test]
    fn valid_six_digit_codes_pass_without_existence(raw in valid_six_digit()) {
        let validator = Validator::from_store(&NomenclatureStore::new());
        let result = validator.validate(&raw, &ValidateOptions::for_version("HS2022").format_only());
        prop_assert!(result.valid, "{raw}: {:?}", result.errors);
        prop_assert!(result.warnings.is_empty());
        prop_assert_eq!(result.code, Code::parse(&raw, "HS2022").ok());
    }

    #[test]
    fn valid_six_digit_codes_pass_without_a_current_version(raw in valid_six_digit()) {
        let validator = Validator::from_store(&NomenclatureStore::new());
        let result = validator.validate(&raw, &ValidateOptions::default().format_only());
        prop_assert!(result.valid, "{raw}: {:?}", result.errors);
        prop_assert!(result.errors.is_empty());
        prop_assert!(result.warnings.is_empty());
    }
}
