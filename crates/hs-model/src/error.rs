use thiserror::Error;

use crate::issue::ErrorKind;

/// A raw code string that could not be turned into a [`crate::Code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("'{raw}' contains characters other than digits and separators")]
    InvalidFormat { raw: String },
    #[error("'{raw}' has {len} digits, at least 6 are required")]
    TooShort { raw: String, len: usize },
    #[error("'{raw}' has {len} digits, at most 12 are allowed")]
    TooLong { raw: String, len: usize },
    #[error("chapter {chapter} of '{raw}' is reserved")]
    InvalidChapter { raw: String, chapter: String },
}

impl CodeError {
    /// The validation error kind this parse failure reports as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::TooShort { .. } => ErrorKind::TooShort,
            Self::TooLong { .. } => ErrorKind::TooLong,
            Self::InvalidChapter { .. } => ErrorKind::InvalidChapter,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodeError>;
