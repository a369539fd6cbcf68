//! Registry entries and the ingestion records they are built from.
//!
//! The tree is strict: section → chapter (2) → heading (4) → subheading (6),
//! with optional national lines (7–12) below a subheading in a jurisdiction
//! registry. Parents are never stored; they are derived from code prefixes.

use serde::{Deserialize, Serialize};

use crate::code::{Level, MIN_CODE_DIGITS};

/// One of the Roman-numbered sections grouping chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Roman numeral as published (e.g., "XVI").
    pub id: String,
    /// Numeric value of the Roman numeral, used for ordering.
    pub number: u16,
    pub title: String,
}

/// A registered code within one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub code: String,
    pub level: Level,
    pub description: String,
    /// Section id; set on chapters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Structural notes (semicolon-separated in source files).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl RegistryEntry {
    pub fn chapter(&self) -> &str {
        &self.code[..2]
    }

    /// Code of the structural parent, `None` for chapters.
    ///
    /// National lines hang off their 6-digit subheading.
    pub fn parent_code(&self) -> Option<&str> {
        match self.level {
            Level::Chapter => None,
            Level::Heading => Some(&self.code[..2]),
            Level::Subheading => Some(&self.code[..4]),
            Level::National => Some(&self.code[..MIN_CODE_DIGITS]),
        }
    }
}

/// Raw section row from an ingestion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: String,
    pub title: String,
}

/// Raw nomenclature row from an ingestion source.
///
/// Declared parents are optional; when present they must agree with the
/// positional prefix of `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub code: String,
    pub description: String,
    pub parent_chapter: Option<String>,
    pub parent_heading: Option<String>,
    pub section: Option<String>,
    pub notes: Option<String>,
}

impl EntryRecord {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_parents(mut self, chapter: Option<&str>, heading: Option<&str>) -> Self {
        self.parent_chapter = chapter.map(String::from);
        self.parent_heading = heading.map(String::from);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Split a semicolon-separated notes cell.
pub fn split_notes(raw: Option<&str>) -> Vec<String> {
    raw.map(|text| {
        text.split(';')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Value of a Roman numeral in I..=MMMCMXCIX, `None` when malformed.
pub fn parse_roman(raw: &str) -> Option<u16> {
    let text = raw.trim().to_uppercase();
    if text.is_empty() {
        return None;
    }
    let value_of = |c: char| match c {
        'I' => Some(1u16),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values: Option<Vec<u16>> = text.chars().map(value_of).collect();
    let values = values?;
    let mut total: i32 = 0;
    for (idx, value) in values.iter().enumerate() {
        match values.get(idx + 1) {
            Some(next) if next > value => total -= i32::from(*value),
            _ => total += i32::from(*value),
        }
    }
    let total = u16::try_from(total).ok().filter(|v| (1..4000).contains(v))?;
    // Reject non-canonical forms like "IIII" or "VX" by round-tripping.
    (to_roman(total) == text).then_some(total)
}

fn to_roman(mut value: u16) -> String {
    const TABLE: &[(u16, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (n, s) in TABLE {
        while value >= *n {
            out.push_str(s);
            value -= n;
        }
    }
    out
}
