//! Parsers for the dataset CSV files.
//!
//! Each parser returns plain records; structural checks happen when the
//! records are ingested into a registry or correlation table.

use std::path::Path;

use hs_model::{CorrelationRecord, EdgeKind, EntryRecord, SectionRecord, VersionId};

use crate::csv_utils::read_csv_rows;
use crate::error::{Result, StandardsError};

/// `Section,Title`
pub fn parse_sections_csv(path: &Path) -> Result<Vec<SectionRecord>> {
    read_csv_rows(path, &["Section", "Title"])?
        .into_iter()
        .map(|row| {
            Ok(SectionRecord {
                id: row.required("Section", path)?,
                title: row.get("Title").to_string(),
            })
        })
        .collect()
}

/// `Code,Description,Parent Chapter,Parent Heading,Section,Notes`
///
/// Only `Code` and `Description` are required columns.
pub fn parse_nomenclature_csv(path: &Path) -> Result<Vec<EntryRecord>> {
    read_csv_rows(path, &["Code", "Description"])?
        .into_iter()
        .map(|row| {
            Ok(EntryRecord {
                code: row.required("Code", path)?,
                description: row.get("Description").to_string(),
                parent_chapter: row.optional("Parent Chapter"),
                parent_heading: row.optional("Parent Heading"),
                section: row.optional("Section"),
                notes: row.optional("Notes"),
            })
        })
        .collect()
}

/// `Code,Description,Notes`
pub fn parse_national_csv(path: &Path) -> Result<Vec<EntryRecord>> {
    read_csv_rows(path, &["Code", "Description"])?
        .into_iter()
        .map(|row| {
            Ok(EntryRecord {
                code: row.required("Code", path)?,
                description: row.get("Description").to_string(),
                notes: row.optional("Notes"),
                ..EntryRecord::default()
            })
        })
        .collect()
}

/// `From Version,From Code,To Version,To Code,Confidence,Weight`
///
/// A missing weight defaults to 1.0.
pub fn parse_correlation_csv(path: &Path) -> Result<Vec<CorrelationRecord>> {
    let columns = [
        "From Version",
        "From Code",
        "To Version",
        "To Code",
        "Confidence",
    ];
    read_csv_rows(path, &columns)?
        .into_iter()
        .map(|row| {
            let kind: EdgeKind = row
                .required("Confidence", path)?
                .parse()
                .map_err(|message: String| {
                    StandardsError::csv(path, format!("line {}: {message}", row.line))
                })?;
            let weight = match row.optional("Weight") {
                Some(raw) => raw.parse::<f64>().map_err(|e| {
                    StandardsError::csv(path, format!("line {}: weight {raw}: {e}", row.line))
                })?,
                None => 1.0,
            };
            Ok(CorrelationRecord {
                from_version: VersionId::new(row.required("From Version", path)?),
                from_code: row.required("From Code", path)?,
                to_version: VersionId::new(row.required("To Version", path)?),
                to_code: row.required("To Code", path)?,
                kind,
                weight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn nomenclature_rows_keep_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "nomenclature.csv",
            "\u{feff}Code,Description,Parent Chapter,Parent Heading,Section,Notes\n\
             84,Machinery,,,XVI,Excludes 8486; see notes\n\
             8471.30,Portable,84,8471,,\n",
        );
        let records = parse_nomenclature_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].section.as_deref(), Some("XVI"));
        assert_eq!(records[0].notes.as_deref(), Some("Excludes 8486; see notes"));
        assert_eq!(records[1].parent_heading.as_deref(), Some("8471"));
        assert_eq!(records[1].section, None);
    }

    #[test]
    fn correlation_rows_parse_kind_and_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "corr.csv",
            "From Version,From Code,To Version,To Code,Confidence,Weight\n\
             HS2017,847130,HS2022,847130,1:1,\n\
             HS2017,850760,HS2022,850761,split,0.4\n",
        );
        let records = parse_correlation_csv(&path).unwrap();
        assert_eq!(records[0].kind, EdgeKind::Exact);
        assert_eq!(records[0].weight, 1.0);
        assert_eq!(records[1].kind, EdgeKind::Split);
        assert_eq!(records[1].weight, 0.4);
    }

    #[test]
    fn reports_line_of_bad_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "corr.csv",
            "From Version,From Code,To Version,To Code,Confidence,Weight\n\
             HS2017,847130,HS2022,847130,sideways,1\n",
        );
        let err = parse_correlation_csv(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "sections.csv", "Section\nXVI\n");
        let err = parse_sections_csv(&path).unwrap_err();
        assert!(err.to_string().contains("missing column Title"));
    }
}
