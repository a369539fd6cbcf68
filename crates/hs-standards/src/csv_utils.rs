//! Shared CSV utilities for loading dataset files.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, StandardsError};

/// One data row keyed by header, with its 1-based line number.
#[derive(Debug, Clone, Default)]
pub struct CsvRow {
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Field value, empty string if absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    /// Field value, `None` if absent or empty.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.fields.get(key).filter(|v| !v.is_empty()).cloned()
    }

    /// Field value, or a CSV error naming the column and line.
    pub fn required(&self, key: &str, path: &Path) -> Result<String> {
        self.optional(key).ok_or_else(|| {
            StandardsError::csv(path, format!("line {}: missing {key}", self.line))
        })
    }
}

/// Read a CSV file into row maps.
///
/// Strips a UTF-8 BOM from headers and trims whitespace from values. Every
/// column in `required_headers` must be present.
pub fn read_csv_rows(path: &Path, required_headers: &[&str]) -> Result<Vec<CsvRow>> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, e.to_string()))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();
    for required in required_headers {
        if !headers.iter().any(|h| h == required) {
            return Err(StandardsError::csv(path, format!("missing column {required}")));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(path, e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.clone(), value.trim().to_string()))
            .collect();
        rows.push(CsvRow { line, fields });
    }
    Ok(rows)
}
