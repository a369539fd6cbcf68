//! International nomenclature registry for one version.
//!
//! Entries live in a flat map keyed by digit string. Hierarchy is derived from
//! positional prefixes, so navigation is computed, never stored:
//!
//! ```text
//! 84        chapter     (section XVI)
//! 8471      heading     parent = 84
//! 847130    subheading  parent = 8471
//! ```
//!
//! A registry is built in one shot by [`Registry::load`] and is read-only
//! afterwards.

use std::collections::BTreeMap;

use hs_model::{
    EntryRecord, Level, RegistryEntry, Section, SectionRecord, VersionId, is_valid_chapter,
    normalize_digits, parse_roman, split_notes,
};
use tracing::{debug, info};

use crate::error::{Result, StandardsError};

/// Entry counts per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    pub sections: usize,
    pub chapters: usize,
    pub headings: usize,
    pub subheadings: usize,
}

#[derive(Debug, Clone)]
pub struct Registry {
    version: VersionId,
    sections: BTreeMap<String, Section>,
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Bulk-build the registry for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`StandardsError::Structural`] when any record breaks the tree:
    /// malformed or duplicated codes, declared parents that disagree with the
    /// code's prefix, chapters without a known section, or an entry whose
    /// positional parent is absent from the batch.
    pub fn load<S, E>(version: impl Into<VersionId>, sections: S, entries: E) -> Result<Self>
    where
        S: IntoIterator<Item = SectionRecord>,
        E: IntoIterator<Item = EntryRecord>,
    {
        let version = version.into();
        let sections = build_sections(&version, sections)?;

        let mut map: BTreeMap<String, RegistryEntry> = BTreeMap::new();
        for record in entries {
            let entry = build_entry(&version, &sections, record)?;
            if map.contains_key(&entry.code) {
                return Err(StandardsError::structural(
                    &version,
                    &entry.code,
                    "duplicate code",
                ));
            }
            map.insert(entry.code.clone(), entry);
        }

        for entry in map.values() {
            if let Some(parent) = entry.parent_code()
                && !map.contains_key(parent)
            {
                return Err(StandardsError::structural(
                    &version,
                    &entry.code,
                    format!("parent {parent} is not part of the batch"),
                ));
            }
        }

        let registry = Self {
            version,
            sections,
            entries: map,
        };
        let stats = registry.stats();
        info!(
            version = %registry.version,
            sections = stats.sections,
            chapters = stats.chapters,
            headings = stats.headings,
            subheadings = stats.subheadings,
            "registry loaded"
        );
        Ok(registry)
    }

    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exists(&self, code: &str) -> bool {
        normalize_digits(code).is_ok_and(|key| self.entries.contains_key(&key))
    }

    pub fn lookup(&self, code: &str) -> Result<&RegistryEntry> {
        normalize_digits(code)
            .ok()
            .and_then(|key| self.entries.get(&key))
            .ok_or_else(|| self.not_found(code))
    }

    /// Entries one level below `code`, ascending by code.
    ///
    /// Subheadings have no children in the international registry. Calling
    /// again restarts the sequence.
    pub fn children<'a>(
        &'a self,
        code: &str,
    ) -> impl Iterator<Item = &'a RegistryEntry> + use<'a> {
        let key = normalize_digits(code).unwrap_or_default();
        let child_len = match key.len() {
            2 => Some(4),
            4 => Some(6),
            _ => None,
        };
        let prefix = key.clone();
        self.entries
            .range(key..)
            .take_while(move |(k, _)| child_len.is_some() && k.starts_with(prefix.as_str()))
            .filter(move |(k, _)| Some(k.len()) == child_len)
            .map(|(_, entry)| entry)
    }

    /// `[chapter, heading, subheading]`, truncated to the depth of `code`.
    ///
    /// Codes longer than a subheading resolve to their subheading's ancestry.
    ///
    /// # Errors
    ///
    /// [`StandardsError::NotFound`] naming the first level that is not
    /// registered.
    pub fn ancestors_of(&self, code: &str) -> Result<Vec<&RegistryEntry>> {
        let key = normalize_digits(code).map_err(|_| self.not_found(code))?;
        if key.len() < 2 {
            return Err(self.not_found(code));
        }
        [2usize, 4, 6]
            .into_iter()
            .filter(|len| *len <= key.len())
            .map(|len| {
                let prefix = &key[..len];
                self.entries
                    .get(prefix)
                    .ok_or_else(|| self.not_found(prefix))
            })
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn chapters(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries_at(Level::Chapter)
    }

    pub fn subheadings(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries_at(Level::Subheading)
    }

    fn entries_at(&self, level: Level) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values().filter(move |e| e.level == level)
    }

    /// Sections ordered by numeral value.
    pub fn sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.values().collect();
        sections.sort_by_key(|s| s.number);
        sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(&id.trim().to_uppercase())
    }

    /// Section of the chapter `code` belongs to.
    pub fn section_of(&self, code: &str) -> Option<&Section> {
        let key = normalize_digits(code).ok()?;
        let chapter = self.entries.get(key.get(..2)?)?;
        chapter.section.as_deref().and_then(|id| self.section(id))
    }

    pub fn chapters_in_section<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a RegistryEntry> + use<'a> {
        let id = id.trim().to_uppercase();
        self.chapters()
            .filter(move |chapter| chapter.section.as_deref() == Some(id.as_str()))
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            sections: self.sections.len(),
            ..RegistryStats::default()
        };
        for entry in self.entries.values() {
            match entry.level {
                Level::Chapter => stats.chapters += 1,
                Level::Heading => stats.headings += 1,
                Level::Subheading => stats.subheadings += 1,
                Level::National => {}
            }
        }
        stats
    }

    fn not_found(&self, code: &str) -> StandardsError {
        StandardsError::NotFound {
            version: self.version.clone(),
            code: code.to_string(),
        }
    }
}

fn build_sections<S>(version: &VersionId, records: S) -> Result<BTreeMap<String, Section>>
where
    S: IntoIterator<Item = SectionRecord>,
{
    let mut sections = BTreeMap::new();
    for record in records {
        let id = record.id.trim().to_uppercase();
        let number = parse_roman(&id).ok_or_else(|| {
            StandardsError::structural(version, &record.id, "section id is not a Roman numeral")
        })?;
        if sections.contains_key(&id) {
            return Err(StandardsError::structural(version, &id, "duplicate section"));
        }
        sections.insert(
            id.clone(),
            Section {
                id,
                number,
                title: record.title.trim().to_string(),
            },
        );
    }
    Ok(sections)
}

fn build_entry(
    version: &VersionId,
    sections: &BTreeMap<String, Section>,
    record: EntryRecord,
) -> Result<RegistryEntry> {
    let code = normalize_digits(&record.code)
        .map_err(|_| StandardsError::structural(version, &record.code, "code is not numeric"))?;
    let level = match Level::for_len(code.len()) {
        Some(Level::National) => {
            return Err(StandardsError::structural(
                version,
                &code,
                "national lines belong in a jurisdiction registry",
            ));
        }
        Some(level) => level,
        None => {
            return Err(StandardsError::structural(
                version,
                &code,
                format!("{} digits is not a chapter, heading or subheading", code.len()),
            ));
        }
    };
    if !is_valid_chapter(&code[..2]) {
        return Err(StandardsError::structural(
            version,
            &code,
            "chapter is reserved",
        ));
    }

    check_declared_parent(version, &code, level, Level::Chapter, record.parent_chapter.as_deref())?;
    check_declared_parent(version, &code, level, Level::Heading, record.parent_heading.as_deref())?;

    let section = match level {
        Level::Chapter => {
            let id = record
                .section
                .as_deref()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| StandardsError::structural(version, &code, "chapter has no section"))?;
            if !sections.contains_key(&id) {
                return Err(StandardsError::structural(
                    version,
                    &code,
                    format!("unknown section {id}"),
                ));
            }
            Some(id)
        }
        _ => {
            if record.section.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                debug!(version = %version, code = %code, "ignoring section declared below chapter level");
            }
            None
        }
    };

    Ok(RegistryEntry {
        code,
        level,
        description: record.description.trim().to_string(),
        section,
        notes: split_notes(record.notes.as_deref()),
    })
}

/// A declared ancestor at `ancestor` level must equal the code's prefix.
fn check_declared_parent(
    version: &VersionId,
    code: &str,
    level: Level,
    ancestor: Level,
    declared: Option<&str>,
) -> Result<()> {
    let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(());
    };
    if level <= ancestor {
        return Err(StandardsError::structural(
            version,
            code,
            format!("a {level} cannot declare a parent {ancestor}"),
        ));
    }
    let expected_len = if ancestor == Level::Chapter { 2 } else { 4 };
    let declared_digits = normalize_digits(declared).unwrap_or_default();
    if declared_digits != code[..expected_len] {
        return Err(StandardsError::structural(
            version,
            code,
            format!("declared parent {ancestor} {declared} disagrees with code prefix"),
        ));
    }
    Ok(())
}
