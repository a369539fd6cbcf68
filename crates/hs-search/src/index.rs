use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use aho_corasick::{AhoCorasick, MatchKind};
use hs_model::{Level, VersionId, normalize_digits};
use hs_standards::{Registry, Snapshot};
use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SearchError};

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Literal, ASCII case-insensitive substring.
    #[default]
    Exact,
    /// Query tokens match the start of description tokens.
    Prefix,
    /// Query tokens within a small edit distance of description tokens.
    Fuzzy,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Version to search; `None` means the current version.
    pub version: Option<VersionId>,
    /// 2-digit chapters to restrict to; empty means all.
    pub chapters: Vec<String>,
    pub limit: usize,
    pub mode: SearchMode,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            version: None,
            chapters: Vec::new(),
            limit: DEFAULT_LIMIT,
            mode: SearchMode::default(),
        }
    }
}

/// Byte range into a hit's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub code: String,
    pub level: Level,
    pub description: String,
    /// Relevance in `0.0..=1.0`.
    pub score: f64,
    pub highlights: Vec<Highlight>,
}

#[derive(Debug, Clone)]
struct Token {
    text: String,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct Document {
    code: String,
    level: Level,
    description: String,
    /// Description length in characters, the tie-breaker.
    chars: usize,
    tokens: Vec<Token>,
}

/// Description index of one registry, built once at ingestion.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    version: VersionId,
    documents: Vec<Document>,
}

impl SearchIndex {
    pub fn build(registry: &Registry) -> Self {
        let documents: Vec<Document> = registry
            .entries()
            .map(|entry| Document {
                code: entry.code.clone(),
                level: entry.level,
                chars: entry.description.chars().count(),
                tokens: tokenize(&entry.description),
                description: entry.description.clone(),
            })
            .collect();
        info!(
            version = %registry.version(),
            documents = documents.len(),
            "search index built"
        );
        Self {
            version: registry.version().clone(),
            documents,
        }
    }

    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ranked hits for `query`. `options.version` is ignored here; the index
    /// already belongs to one version.
    ///
    /// Ordered by score descending, then shorter description, then code.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() || options.limit == 0 {
            return Vec::new();
        }
        let matcher = match Matcher::new(query, options.mode) {
            Some(matcher) => matcher,
            None => return Vec::new(),
        };
        let chapters = chapter_keys(&options.chapters);
        if chapters.is_empty() && !options.chapters.is_empty() {
            debug!(chapters = ?options.chapters, "no usable chapter in filter");
            return Vec::new();
        }

        let mut scored: Vec<(&Document, f64, Vec<Highlight>)> = self
            .documents
            .iter()
            .filter(|doc| in_chapters(&doc.code, &chapters))
            .filter_map(|doc| {
                let (score, highlights) = matcher.score(doc)?;
                Some((doc, score, highlights))
            })
            .collect();
        scored.sort_by(|(a, sa, _), (b, sb, _)| {
            sb.total_cmp(sa)
                .then_with(|| a.chars.cmp(&b.chars))
                .then_with(|| a.code.cmp(&b.code))
        });
        debug!(query, mode = ?options.mode, matches = scored.len(), "search executed");

        scored
            .into_iter()
            .take(options.limit)
            .map(|(doc, score, highlights)| SearchHit {
                code: doc.code.clone(),
                level: doc.level,
                description: doc.description.clone(),
                score,
                highlights,
            })
            .collect()
    }
}

/// One index per loaded version of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SearchCatalog {
    snapshot: Arc<Snapshot>,
    indexes: BTreeMap<VersionId, SearchIndex>,
}

impl SearchCatalog {
    pub fn build(snapshot: Arc<Snapshot>) -> Self {
        let indexes = snapshot
            .versions()
            .into_iter()
            .map(|data| (data.id().clone(), SearchIndex::build(&data.registry)))
            .collect();
        Self { snapshot, indexes }
    }

    pub fn index(&self, version: &VersionId) -> Result<&SearchIndex> {
        self.indexes
            .get(version)
            .ok_or_else(|| SearchError::VersionUnsupported {
                version: version.clone(),
            })
    }

    /// Search `options.version`, or the snapshot's current version.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        let version = match &options.version {
            Some(version) => version.clone(),
            None => self
                .snapshot
                .current()
                .map(|data| data.id().clone())
                .ok_or(SearchError::NoCurrentVersion)?,
        };
        Ok(self.index(&version)?.search(query, options))
    }
}

enum Matcher {
    Exact { automaton: AhoCorasick, len: usize },
    Prefix { tokens: Vec<String> },
    Fuzzy { tokens: Vec<String> },
}

impl Matcher {
    fn new(query: &str, mode: SearchMode) -> Option<Self> {
        match mode {
            SearchMode::Exact => {
                let automaton = AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::LeftmostFirst)
                    .build([query])
                    .ok()?;
                Some(Self::Exact {
                    automaton,
                    len: query.chars().count(),
                })
            }
            SearchMode::Prefix | SearchMode::Fuzzy => {
                let tokens: Vec<String> = tokenize(query).into_iter().map(|t| t.text).collect();
                if tokens.is_empty() {
                    return None;
                }
                Some(if mode == SearchMode::Prefix {
                    Self::Prefix { tokens }
                } else {
                    Self::Fuzzy { tokens }
                })
            }
        }
    }

    fn score(&self, doc: &Document) -> Option<(f64, Vec<Highlight>)> {
        match self {
            Self::Exact { automaton, len } => {
                let highlights: Vec<Highlight> = automaton
                    .find_iter(&doc.description)
                    .map(|m| Highlight {
                        start: m.start(),
                        end: m.end(),
                    })
                    .collect();
                if highlights.is_empty() || doc.chars == 0 {
                    return None;
                }
                Some((ratio(*len, doc.chars), highlights))
            }
            Self::Prefix { tokens } => {
                let mut matched = 0;
                let mut highlights = Vec::new();
                for query in tokens {
                    let hits: Vec<&Token> = doc
                        .tokens
                        .iter()
                        .filter(|t| t.text.starts_with(query.as_str()))
                        .collect();
                    if !hits.is_empty() {
                        matched += 1;
                    }
                    highlights.extend(hits.into_iter().map(|t| Highlight {
                        start: t.start,
                        end: (t.start + query.len()).min(t.end),
                    }));
                }
                (matched > 0).then(|| (ratio(matched, tokens.len()), merge(highlights)))
            }
            Self::Fuzzy { tokens } => {
                let mut total = 0.0;
                let mut matched = false;
                let mut highlights = Vec::new();
                for query in tokens {
                    let best = doc
                        .tokens
                        .iter()
                        .filter_map(|t| fuzzy_similarity(query, &t.text).map(|s| (s, t)))
                        .max_by(|(a, ta), (b, tb)| a.total_cmp(b).then_with(|| tb.start.cmp(&ta.start)));
                    if let Some((similarity, token)) = best {
                        matched = true;
                        total += similarity;
                        highlights.push(Highlight {
                            start: token.start,
                            end: token.end,
                        });
                    }
                }
                matched.then(|| (total / tokens.len() as f64, merge(highlights)))
            }
        }
    }
}

/// Largest edit distance tolerated for a query token of `len` characters.
fn max_distance(len: usize) -> usize {
    match len {
        0..=3 => 0,
        4..=5 => 1,
        _ => 2,
    }
}

/// Similarity in `0.0..=1.0`, or `None` when beyond the distance bound.
fn fuzzy_similarity(query: &str, token: &str) -> Option<f64> {
    let query_len = query.chars().count();
    let token_len = token.chars().count();
    if query_len.abs_diff(token_len) > max_distance(query_len) {
        return None;
    }
    let distance = levenshtein::distance(query.chars(), token.chars());
    if distance > max_distance(query_len) {
        return None;
    }
    let longest = query_len.max(token_len).max(1);
    Some(1.0 - distance as f64 / longest as f64)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64).min(1.0)
}

/// Two-digit chapter keys of a filter. `8` means chapter 08 and longer codes
/// such as `84.71` keep their chapter; non-numeric entries are dropped.
fn chapter_keys(chapters: &[String]) -> Vec<String> {
    chapters
        .iter()
        .filter_map(|raw| {
            let digits = normalize_digits(raw).ok()?;
            Some(match digits.len() {
                1 => format!("0{digits}"),
                _ => digits[..2].to_string(),
            })
        })
        .collect()
}

fn in_chapters(code: &str, chapters: &[String]) -> bool {
    chapters.is_empty() || chapters.iter().any(|c| code.get(..2) == Some(c.as_str()))
}

/// ASCII-lowercased alphanumeric runs with their byte ranges.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match (ch.is_alphanumeric(), start) {
            (true, None) => start = Some(idx),
            (false, Some(begin)) => {
                tokens.push(token(text, begin, idx));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        tokens.push(token(text, begin, text.len()));
    }
    tokens
}

fn token(text: &str, start: usize, end: usize) -> Token {
    Token {
        text: text[start..end].to_ascii_lowercase(),
        start,
        end,
    }
}

/// Sort and coalesce overlapping ranges.
fn merge(mut highlights: Vec<Highlight>) -> Vec<Highlight> {
    highlights.sort();
    let mut merged: Vec<Highlight> = Vec::with_capacity(highlights.len());
    for h in highlights {
        match merged.last_mut() {
            Some(last) if h.start <= last.end => last.end = last.end.max(h.end),
            _ => merged.push(h),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_carry_byte_ranges() {
        let tokens = tokenize("Portable machines, <10 kg");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["portable", "machines", "10", "kg"]);
        assert_eq!((tokens[1].start, tokens[1].end), (9, 17));
    }

    #[test]
    fn distance_bound_grows_with_token_length() {
        assert_eq!(fuzzy_similarity("cat", "cot"), None);
        assert!(fuzzy_similarity("lapto", "lapt0").is_some());
        assert_eq!(fuzzy_similarity("lapto", "lxptx"), None);
        let sim = fuzzy_similarity("machnes", "machines").unwrap();
        assert!(sim > 0.8 && sim < 1.0);
    }

    #[test]
    fn chapter_filters_are_normalized() {
        let raw: Vec<String> = ["8", " 84", "84.71", "x1"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(chapter_keys(&raw), vec!["08", "84", "84"]);
    }

    #[test]
    fn overlapping_highlights_coalesce() {
        let merged = merge(vec![
            Highlight { start: 5, end: 9 },
            Highlight { start: 0, end: 3 },
            Highlight { start: 7, end: 12 },
        ]);
        assert_eq!(
            merged,
            vec![Highlight { start: 0, end: 3 }, Highlight { start: 5, end: 12 }]
        );
    }
}
