//! Nomenclature versions and jurisdictions.
//!
//! A version is an opaque identifier (`HS2017`, `2022`, ...) with an
//! effective date range. Ranges are half-open: `effective_to` is the first
//! day the version is no longer in force.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a nomenclature revision. Compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VersionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.0
    }
}

/// Issuing jurisdiction of national extension digits (e.g. `US`, `EU`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Jurisdiction(String);

impl Jurisdiction {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Jurisdiction {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Jurisdiction {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Jurisdiction> for String {
    fn from(value: Jurisdiction) -> Self {
        value.0
    }
}

/// A dated revision of the whole classification tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomenclatureVersion {
    pub id: VersionId,
    /// Display label (e.g., "HS 2022 Edition").
    pub label: Option<String>,
    pub effective_from: NaiveDate,
    /// Exclusive end of the range; `None` means still in force.
    pub effective_to: Option<NaiveDate>,
}

impl NomenclatureVersion {
    pub fn new(id: impl Into<VersionId>, effective_from: NaiveDate) -> Self {
        Self {
            id: id.into(),
            label: None,
            effective_from,
            effective_to: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn until(mut self, effective_to: NaiveDate) -> Self {
        self.effective_to = Some(effective_to);
        self
    }

    /// Whether a transaction dated `date` resolves against this version.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|end| date < end)
    }

    /// Whether the two effective ranges share at least one day.
    pub fn overlaps(&self, other: &NomenclatureVersion) -> bool {
        let starts_before_other_ends = other.effective_to.is_none_or(|end| self.effective_from < end);
        let other_starts_before_end = self.effective_to.is_none_or(|end| other.effective_from < end);
        starts_before_other_ends && other_starts_before_end
    }
}
