use hs_model::VersionId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CorrelateError {
    #[error("'{raw}' is not a numeric code")]
    InvalidFormat { raw: String },

    #[error("nomenclature version {version} is not loaded")]
    VersionUnsupported { version: VersionId },

    #[error("no correlation tables connect {from} to {to}")]
    NoCorrelationPath { from: VersionId, to: VersionId },
}

pub type Result<T> = std::result::Result<T, CorrelateError>;
