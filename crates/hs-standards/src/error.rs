#![deny(unsafe_code)]

use std::path::PathBuf;

use hs_model::{Jurisdiction, VersionId};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Ingested data does not form a strict tree; the batch is rejected.
    #[error("structural error in {version} at '{code}': {message}")]
    Structural {
        version: VersionId,
        code: String,
        message: String,
    },

    #[error("code '{code}' is not registered in {version}")]
    NotFound { version: VersionId, code: String },

    #[error("nomenclature version {version} is not loaded")]
    VersionUnsupported { version: VersionId },

    #[error("no {jurisdiction} registry is loaded for {version}")]
    JurisdictionUnsupported {
        version: VersionId,
        jurisdiction: Jurisdiction,
    },

    #[error("effective range of {version} overlaps {existing}")]
    OverlappingVersion {
        version: VersionId,
        existing: VersionId,
    },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("missing required role in manifest: {role}")]
    MissingRole { role: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("unexpected file present under the data directory: {path}")]
    UnexpectedFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn structural(
        version: &VersionId,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Structural {
            version: version.clone(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Csv {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
