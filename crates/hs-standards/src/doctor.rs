#![deny(unsafe_code)]

use crate::dataset::{CorrelationSummary, VerifySummary, VersionSummary};
use crate::manifest::ManifestFile;

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub versions: Vec<VersionSummary>,
    pub correlations: Vec<CorrelationSummary>,
    pub files: Vec<ManifestFile>,
    pub counts: DoctorCounts,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub versions: usize,
    pub jurisdictions: usize,
    pub subheadings: usize,
    pub correlation_tables: usize,
}

impl DoctorReport {
    pub fn from_verify_summary(summary: &VerifySummary, files: Vec<ManifestFile>) -> Self {
        Self {
            schema: "hs-codes.dataset-doctor".to_string(),
            schema_version: 1,
            versions: summary.versions.clone(),
            correlations: summary.correlations.clone(),
            files,
            counts: DoctorCounts {
                files: summary.file_count,
                versions: summary.versions.len(),
                jurisdictions: summary.versions.iter().map(|v| v.jurisdictions.len()).sum(),
                subheadings: summary.versions.iter().map(|v| v.stats.subheadings).sum(),
                correlation_tables: summary.correlations.len(),
            },
        }
    }
}
