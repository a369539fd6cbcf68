//! National tariff lines layered over an international registry.

use std::collections::BTreeMap;

use hs_model::{
    EntryRecord, Jurisdiction, Level, RegistryEntry, VersionId, normalize_digits, split_notes,
};
use tracing::info;

use crate::error::{Result, StandardsError};
use crate::registry::Registry;

/// Extension codes (7–12 digits) issued by one jurisdiction for one version.
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    jurisdiction: Jurisdiction,
    version: VersionId,
    entries: BTreeMap<String, RegistryEntry>,
}

impl JurisdictionRegistry {
    /// Build national lines on top of `base`.
    ///
    /// # Errors
    ///
    /// [`StandardsError::Structural`] when a line is not 7–12 digits, is
    /// duplicated, or hangs off a subheading that `base` does not register.
    pub fn load<E>(base: &Registry, jurisdiction: impl Into<Jurisdiction>, records: E) -> Result<Self>
    where
        E: IntoIterator<Item = EntryRecord>,
    {
        let jurisdiction = jurisdiction.into();
        let version = base.version().clone();
        let mut entries = BTreeMap::new();

        for record in records {
            let code = normalize_digits(&record.code).map_err(|_| {
                StandardsError::structural(&version, &record.code, "code is not numeric")
            })?;
            if Level::for_len(code.len()) != Some(Level::National) {
                return Err(StandardsError::structural(
                    &version,
                    &code,
                    format!("{jurisdiction} lines must have 7 to 12 digits"),
                ));
            }
            let subheading = &code[..6];
            if !base.lookup(subheading).is_ok_and(|e| e.level == Level::Subheading) {
                return Err(StandardsError::structural(
                    &version,
                    &code,
                    format!("subheading {subheading} is not registered"),
                ));
            }
            if entries.contains_key(&code) {
                return Err(StandardsError::structural(&version, &code, "duplicate code"));
            }
            entries.insert(
                code.clone(),
                RegistryEntry {
                    code,
                    level: Level::National,
                    description: record.description.trim().to_string(),
                    section: None,
                    notes: split_notes(record.notes.as_deref()),
                },
            );
        }

        info!(
            version = %version,
            jurisdiction = %jurisdiction,
            lines = entries.len(),
            "jurisdiction registry loaded"
        );
        Ok(Self {
            jurisdiction,
            version,
            entries,
        })
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
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
            .ok_or_else(|| StandardsError::NotFound {
                version: self.version.clone(),
                code: code.to_string(),
            })
    }

    /// National lines starting with `prefix`, ascending by code.
    pub fn lines_under<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = &'a RegistryEntry> + use<'a> {
        let key = normalize_digits(prefix).unwrap_or_default();
        let prefix_len = key.len();
        let owned = key.clone();
        self.entries
            .range(key..)
            .take_while(move |(k, _)| prefix_len > 0 && k.starts_with(owned.as_str()))
            .filter(move |(k, _)| k.len() > prefix_len)
            .map(|(_, entry)| entry)
    }
}
