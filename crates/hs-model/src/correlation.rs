//! Correlation edges between nomenclature versions and conversion results.
//!
//! Edges are directed: an edge `HS2017:847130 -> HS2022:847130` says nothing
//! about the reverse direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::VersionId;

/// Relationship declared by a correlation table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Unambiguous one-to-one.
    Exact,
    /// Heuristic single best match.
    Probable,
    /// One of several plausible targets.
    Uncertain,
    /// Structurally one-to-many.
    Split,
    /// Structurally many-to-one.
    Merge,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Probable => "probable",
            Self::Uncertain => "uncertain",
            Self::Split => "split",
            Self::Merge => "merge",
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Split | Self::Merge)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "1:1" => Ok(Self::Exact),
            "probable" => Ok(Self::Probable),
            "uncertain" => Ok(Self::Uncertain),
            "split" | "1:n" => Ok(Self::Split),
            "merge" | "n:1" => Ok(Self::Merge),
            other => Err(format!("unknown correlation kind: {other}")),
        }
    }
}

/// Confidence of a conversion result.
///
/// A closed set so that callers handle every case exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Exact,
    Probable,
    Uncertain,
    Split,
    Merge,
    NotFound,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Probable => "probable",
            Self::Uncertain => "uncertain",
            Self::Split => "split",
            Self::Merge => "merge",
            Self::NotFound => "not_found",
        }
    }

    /// Ambiguous by nomenclature design rather than by heuristic.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Split | Self::Merge)
    }

    /// Cap at `Probable`; structural and weaker confidences pass through.
    #[must_use]
    pub fn capped_at_probable(self) -> Self {
        match self {
            Self::Exact => Self::Probable,
            other => other,
        }
    }
}

impl From<EdgeKind> for Confidence {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Exact => Self::Exact,
            EdgeKind::Probable => Self::Probable,
            EdgeKind::Uncertain => Self::Uncertain,
            EdgeKind::Split => Self::Split,
            EdgeKind::Merge => Self::Merge,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw correlation row from an ingestion source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub from_version: VersionId,
    pub from_code: String,
    pub to_version: VersionId,
    pub to_code: String,
    pub kind: EdgeKind,
    /// Relevance weight used to order alternatives; higher ranks first.
    pub weight: f64,
}

impl CorrelationRecord {
    pub fn new(
        from: (&str, &str),
        to: (&str, &str),
        kind: EdgeKind,
        weight: f64,
    ) -> Self {
        Self {
            from_version: VersionId::new(from.0),
            from_code: from.1.to_string(),
            to_version: VersionId::new(to.0),
            to_code: to.1.to_string(),
            kind,
            weight,
        }
    }
}

/// One candidate target of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub code: String,
    pub weight: f64,
    pub kind: EdgeKind,
}

/// Granularity a conversion fell back to after the full code had no edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackLevel {
    Subheading,
    Heading,
}

/// Result of projecting a code from one version onto another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub source: String,
    pub from: VersionId,
    pub to: VersionId,
    /// Single target, set only when the mapping is not ambiguous.
    pub target: Option<String>,
    pub confidence: Confidence,
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackLevel>,
    /// Other source codes merged into the same target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_with: Vec<String>,
    /// Intermediate versions traversed when no direct table exists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<VersionId>,
}

impl Conversion {
    /// Same-version projection.
    pub fn identity(source: impl Into<String>, version: VersionId) -> Self {
        let source = source.into();
        Self {
            target: Some(source.clone()),
            source,
            from: version.clone(),
            to: version,
            confidence: Confidence::Exact,
            alternatives: Vec::new(),
            fallback: None,
            merged_with: Vec::new(),
            via: Vec::new(),
        }
    }

    pub fn not_found(source: impl Into<String>, from: VersionId, to: VersionId) -> Self {
        Self {
            source: source.into(),
            from,
            to,
            target: None,
            confidence: Confidence::NotFound,
            alternatives: Vec::new(),
            fallback: None,
            merged_with: Vec::new(),
            via: Vec::new(),
        }
    }
}
