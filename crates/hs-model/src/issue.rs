use serde::{Deserialize, Serialize};

use crate::code::Code;

/// Fatal validation findings. Any one of these makes a code invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidFormat,
    TooShort,
    TooLong,
    InvalidChapter,
    NotFound,
    JurisdictionUnsupported,
    VersionUnsupported,
}

impl ErrorKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "contains characters other than digits",
            Self::TooShort => "fewer than 6 digits",
            Self::TooLong => "more than 12 digits",
            Self::InvalidChapter => "chapter is reserved",
            Self::NotFound => "not registered in the nomenclature",
            Self::JurisdictionUnsupported => "no registry loaded for the jurisdiction",
            Self::VersionUnsupported => "nomenclature version not loaded",
        }
    }
}

/// Non-fatal validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningKind {
    UnusualLength,
}

impl WarningKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnusualLength => "longer than the usual tariff line",
        }
    }
}

/// Structured verdict for one raw code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The raw input as supplied.
    pub input: String,
    pub valid: bool,
    /// Parsed code when the format checks passed.
    pub code: Option<Code>,
    pub errors: Vec<ErrorKind>,
    pub warnings: Vec<WarningKind>,
}

impl ValidationResult {
    /// Build a verdict; validity follows from the absence of errors.
    pub fn new(
        input: impl Into<String>,
        code: Option<Code>,
        errors: Vec<ErrorKind>,
        warnings: Vec<WarningKind>,
    ) -> Self {
        Self {
            input: input.into(),
            valid: errors.is_empty(),
            code,
            errors,
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Counts over a batch of verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub with_warnings: usize,
}

impl ValidationSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let valid = results.iter().filter(|r| r.valid).count();
        Self {
            total: results.len(),
            valid,
            invalid: results.len() - valid,
            with_warnings: results.iter().filter(|r| r.has_warnings()).count(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.invalid > 0
    }
}
