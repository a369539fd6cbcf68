use hs_model::VersionId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SearchError {
    #[error("no search index for nomenclature version {version}")]
    VersionUnsupported { version: VersionId },

    #[error("no version given and none is current")]
    NoCurrentVersion,
}

pub type Result<T> = std::result::Result<T, SearchError>;
