//! Classification codes and their positional decomposition.
//!
//! A code is a digit string tied to one nomenclature version:
//!
//! ```text
//! 8471.30.01.00
//! ^^             chapter       (2 digits)
//! ^^^^           heading       (4 digits)
//! ^^^^^^^        subheading    (6 digits, international leaf)
//!        ^^^^^^  national extension (jurisdiction-defined)
//! ```
//!
//! Decomposition is purely positional; whether each level is registered is a
//! registry question, not a parsing one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodeError, Result};
use crate::issue::WarningKind;
use crate::version::{Jurisdiction, VersionId};

/// Fewest digits a classification code may carry (the subheading).
pub const MIN_CODE_DIGITS: usize = 6;

/// Most digits any jurisdiction appends up to.
pub const MAX_CODE_DIGITS: usize = 12;

/// Codes this long or longer parse but are flagged as unusual.
pub const UNUSUAL_LENGTH_DIGITS: usize = 10;

/// Chapters that never hold internationally valid codes.
///
/// 77 is reserved for future use, 98 and 99 for national use.
pub const RESERVED_CHAPTERS: &[&str] = &["00", "77", "98", "99"];

/// Depth of a code in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Chapter,
    Heading,
    Subheading,
    National,
}

impl Level {
    /// Level implied by a digit count, if the count is a legal one.
    pub fn for_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(Self::Chapter),
            4 => Some(Self::Heading),
            6 => Some(Self::Subheading),
            7..=MAX_CODE_DIGITS => Some(Self::National),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Heading => "heading",
            Self::Subheading => "subheading",
            Self::National => "national",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip dots and whitespace and require the remainder to be ASCII digits.
///
/// This is the formatting step of [`Code::parse`] without any length or
/// chapter policy.
pub fn normalize_digits(raw: &str) -> Result<String> {
    let digits: String = raw
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodeError::InvalidFormat {
            raw: raw.to_string(),
        });
    }
    Ok(digits)
}

/// Whether a 2-digit chapter is outside the reserved set.
pub fn is_valid_chapter(chapter: &str) -> bool {
    chapter.len() == 2
        && chapter.bytes().all(|b| b.is_ascii_digit())
        && !RESERVED_CHAPTERS.contains(&chapter)
}

/// A parsed, immutable classification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Code {
    digits: String,
    version: VersionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<Jurisdiction>,
}

impl Code {
    /// Parse a raw code for a nomenclature version.
    ///
    /// # Errors
    ///
    /// Returns the first format rule the input breaks, checked in order:
    /// digits only, at least 6 digits, at most 12 digits, unreserved chapter.
    pub fn parse(raw: &str, version: impl Into<VersionId>) -> Result<Self> {
        let digits = normalize_digits(raw)?;
        let len = digits.len();
        if len < MIN_CODE_DIGITS {
            return Err(CodeError::TooShort {
                raw: raw.to_string(),
                len,
            });
        }
        if len > MAX_CODE_DIGITS {
            return Err(CodeError::TooLong {
                raw: raw.to_string(),
                len,
            });
        }
        let chapter = &digits[..2];
        if !is_valid_chapter(chapter) {
            return Err(CodeError::InvalidChapter {
                raw: raw.to_string(),
                chapter: chapter.to_string(),
            });
        }
        Ok(Self {
            digits,
            version: version.into(),
            jurisdiction: None,
        })
    }

    /// Parse a raw code issued by a specific jurisdiction.
    pub fn parse_for(
        raw: &str,
        version: impl Into<VersionId>,
        jurisdiction: impl Into<Jurisdiction>,
    ) -> Result<Self> {
        let mut code = Self::parse(raw, version)?;
        code.jurisdiction = Some(jurisdiction.into());
        Ok(code)
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn jurisdiction(&self) -> Option<&Jurisdiction> {
        self.jurisdiction.as_ref()
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Always false: a parsed code has at least six digits.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn chapter(&self) -> &str {
        &self.digits[..2]
    }

    pub fn heading(&self) -> &str {
        &self.digits[..4]
    }

    pub fn subheading(&self) -> &str {
        &self.digits[..MIN_CODE_DIGITS]
    }

    /// Digits beyond the subheading, if any.
    pub fn extension(&self) -> Option<&str> {
        let ext = &self.digits[MIN_CODE_DIGITS..];
        (!ext.is_empty()).then_some(ext)
    }

    pub fn has_extension(&self) -> bool {
        self.digits.len() > MIN_CODE_DIGITS
    }

    pub fn level(&self) -> Level {
        if self.has_extension() {
            Level::National
        } else {
            Level::Subheading
        }
    }

    /// Non-fatal observations about this code.
    pub fn warnings(&self) -> Vec<WarningKind> {
        let mut warnings = Vec::new();
        if self.digits.len() >= UNUSUAL_LENGTH_DIGITS {
            warnings.push(WarningKind::UnusualLength);
        }
        warnings
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", &self.digits[..4], &self.digits[4..6])?;
        let mut rest = &self.digits[6..];
        while !rest.is_empty() {
            let take = rest.len().min(2);
            write!(f, ".{}", &rest[..take])?;
            rest = &rest[take..];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators() {
        let code = Code::parse("8471.30", "HS2022").unwrap();
        assert_eq!(code.digits(), "847130");
        let code = Code::parse(" 8471 30 01 ", "HS2022").unwrap();
        assert_eq!(code.digits(), "84713001");
    }

    #[test]
    fn decomposes_positionally() {
        let code = Code::parse("8471300100", "HS2022").unwrap();
        assert_eq!(code.chapter(), "84");
        assert_eq!(code.heading(), "8471");
        assert_eq!(code.subheading(), "847130");
        assert_eq!(code.extension(), Some("0100"));
        assert_eq!(code.level(), Level::National);
    }

    #[test]
    fn rejects_in_rule_order() {
        assert_eq!(
            Code::parse("84713A", "HS2022").unwrap_err().kind(),
            crate::ErrorKind::InvalidFormat
        );
        assert_eq!(
            Code::parse("", "HS2022").unwrap_err().kind(),
            crate::ErrorKind::InvalidFormat
        );
        assert_eq!(
            Code::parse("8471", "HS2022").unwrap_err().kind(),
            crate::ErrorKind::TooShort
        );
        assert_eq!(
            Code::parse("8471300000001", "HS2022").unwrap_err().kind(),
            crate::ErrorKind::TooLong
        );
        assert_eq!(
            Code::parse("990110", "HS2022").unwrap_err().kind(),
            crate::ErrorKind::InvalidChapter
        );
    }

    #[test]
    fn formats_with_dots() {
        let fmt = |raw: &str| Code::parse(raw, "HS2022").unwrap().to_string();
        assert_eq!(fmt("847130"), "8471.30");
        assert_eq!(fmt("84713001"), "8471.30.01");
        assert_eq!(fmt("8471300100"), "8471.30.01.00");
        assert_eq!(fmt("8471301"), "8471.30.1");
    }

    #[test]
    fn flags_long_codes() {
        let short = Code::parse("84713001", "HS2022").unwrap();
        assert!(short.warnings().is_empty());
        let long = Code::parse("8471300000", "HS2022").unwrap();
        assert_eq!(long.warnings(), vec![WarningKind::UnusualLength]);
    }

    #[test]
    fn level_for_len() {
        assert_eq!(Level::for_len(2), Some(Level::Chapter));
        assert_eq!(Level::for_len(4), Some(Level::Heading));
        assert_eq!(Level::for_len(6), Some(Level::Subheading));
        assert_eq!(Level::for_len(10), Some(Level::National));
        assert_eq!(Level::for_len(3), None);
        assert_eq!(Level::for_len(13), None);
    }
}
