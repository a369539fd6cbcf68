//! Harmonized System classification model.
//!
//! Value types shared by every crate in the workspace: parsed codes,
//! nomenclature versions, registry entries, correlation edges and the
//! structured validation verdict.

pub mod code;
pub mod correlation;
pub mod entry;
pub mod error;
pub mod issue;
pub mod version;

pub use code::{
    Code, Level, MAX_CODE_DIGITS, MIN_CODE_DIGITS, RESERVED_CHAPTERS, UNUSUAL_LENGTH_DIGITS,
    is_valid_chapter, normalize_digits,
};
pub use correlation::{
    Alternative, Confidence, Conversion, CorrelationRecord, EdgeKind, FallbackLevel,
};
pub use entry::{EntryRecord, RegistryEntry, Section, SectionRecord, parse_roman, split_notes};
pub use error::{CodeError, Result};
pub use issue::{ErrorKind, ValidationResult, ValidationSummary, WarningKind};
pub use version::{Jurisdiction, NomenclatureVersion, VersionId};
