#![deny(unsafe_code)]

use chrono::NaiveDate;
use hs_model::{NomenclatureVersion, VersionId};
use serde::{Deserialize, Serialize};

pub const MANIFEST_SCHEMA: &str = "hs-codes.dataset-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub notes: Option<ManifestNotes>,
    #[serde(default)]
    pub versions: Vec<ManifestVersion>,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNotes {
    pub summary: Option<String>,
}

/// Version pin. Dates are ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestVersion {
    pub id: VersionId,
    #[serde(default)]
    pub label: Option<String>,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Pin as current regardless of today's date.
    #[serde(default)]
    pub current: bool,
}

impl ManifestVersion {
    pub fn to_version(&self) -> NomenclatureVersion {
        NomenclatureVersion {
            id: self.id.clone(),
            label: self.label.clone(),
            effective_from: self.effective_from,
            effective_to: self.effective_to,
        }
    }
}

/// What a listed file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// `sections.csv`, shared by every version.
    Sections,
    /// International registry of one `version`.
    Nomenclature,
    /// National lines of one `jurisdiction` in one `version`.
    National,
    /// Directed table `from -> to`.
    Correlation,
    /// Documentation; verified but never parsed.
    Other,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sections => "sections",
            Self::Nomenclature => "nomenclature",
            Self::National => "national",
            Self::Correlation => "correlation",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub sha256: String,
    pub kind: String,
    pub role: FileRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
