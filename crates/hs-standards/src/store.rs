//! Versioned, concurrently readable nomenclature store.
//!
//! Readers take an [`Arc<Snapshot>`] and work against it without further
//! locking. Writers are serialized, build the new data off to the side, and
//! swap a fresh snapshot in under a short write lock, so a failed ingestion
//! never changes what readers see.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDate;
use hs_model::{
    CorrelationRecord, EntryRecord, Jurisdiction, NomenclatureVersion, SectionRecord, VersionId,
};
use tracing::{info, warn};

use crate::correlation::CorrelationTable;
use crate::error::{Result, StandardsError};
use crate::jurisdiction::JurisdictionRegistry;
use crate::registry::Registry;

/// Everything loaded for one nomenclature version.
#[derive(Debug, Clone)]
pub struct VersionData {
    pub version: NomenclatureVersion,
    pub registry: Registry,
    pub jurisdictions: BTreeMap<Jurisdiction, Arc<JurisdictionRegistry>>,
}

impl VersionData {
    pub fn id(&self) -> &VersionId {
        &self.version.id
    }

    pub fn jurisdiction(&self, jurisdiction: &Jurisdiction) -> Result<&JurisdictionRegistry> {
        self.jurisdictions
            .get(jurisdiction)
            .map(Arc::as_ref)
            .ok_or_else(|| StandardsError::JurisdictionUnsupported {
                version: self.version.id.clone(),
                jurisdiction: jurisdiction.clone(),
            })
    }
}

/// Immutable view of every loaded version and correlation table.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    versions: BTreeMap<VersionId, Arc<VersionData>>,
    correlations: BTreeMap<(VersionId, VersionId), Arc<CorrelationTable>>,
    pinned: Option<VersionId>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Loaded versions ordered by effective date.
    pub fn versions(&self) -> Vec<&VersionData> {
        let mut versions: Vec<&VersionData> = self.versions.values().map(Arc::as_ref).collect();
        versions.sort_by_key(|v| v.version.effective_from);
        versions
    }

    pub fn version(&self, id: &VersionId) -> Result<&VersionData> {
        self.versions
            .get(id)
            .map(Arc::as_ref)
            .ok_or_else(|| StandardsError::VersionUnsupported {
                version: id.clone(),
            })
    }

    pub fn registry(&self, id: &VersionId) -> Result<&Registry> {
        self.version(id).map(|data| &data.registry)
    }

    /// The version in force on `date`, if any.
    pub fn version_at(&self, date: NaiveDate) -> Option<&VersionData> {
        self.versions
            .values()
            .map(Arc::as_ref)
            .find(|data| data.version.is_effective_on(date))
    }

    /// The pinned version, else the one in force on `today`.
    pub fn current_on(&self, today: NaiveDate) -> Option<&VersionData> {
        match &self.pinned {
            Some(id) => self.versions.get(id).map(Arc::as_ref),
            None => self.version_at(today),
        }
    }

    /// [`Snapshot::current_on`] for the local calendar date.
    pub fn current(&self) -> Option<&VersionData> {
        self.current_on(chrono::Local::now().date_naive())
    }

    pub fn pinned(&self) -> Option<&VersionId> {
        self.pinned.as_ref()
    }

    pub fn correlation(&self, from: &VersionId, to: &VersionId) -> Option<&CorrelationTable> {
        self.correlations
            .get(&(from.clone(), to.clone()))
            .map(Arc::as_ref)
    }

    /// Tables leaving `from`, ordered by target version.
    pub fn correlations_from<'a>(
        &'a self,
        from: &VersionId,
    ) -> impl Iterator<Item = &'a CorrelationTable> + use<'a> {
        let from = from.clone();
        self.correlations
            .iter()
            .filter(move |((source, _), _)| *source == from)
            .map(|(_, table)| table.as_ref())
    }

    pub fn correlation_pairs(&self) -> impl Iterator<Item = (&VersionId, &VersionId)> {
        self.correlations.keys().map(|(from, to)| (from, to))
    }
}

/// Shared handle to the loaded nomenclature.
#[derive(Debug, Default)]
pub struct NomenclatureStore {
    snapshot: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl NomenclatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load (or replace) one international registry.
    ///
    /// Replacing a version drops its jurisdiction registries and every
    /// correlation table touching it; they must be ingested again.
    ///
    /// # Errors
    ///
    /// [`StandardsError::OverlappingVersion`] when the effective range
    /// overlaps another loaded version, or [`StandardsError::Structural`]
    /// when the batch does not form a tree. Either way the visible snapshot
    /// is untouched.
    pub fn ingest_version<S, E>(
        &self,
        version: NomenclatureVersion,
        sections: S,
        entries: E,
    ) -> Result<()>
    where
        S: IntoIterator<Item = SectionRecord>,
        E: IntoIterator<Item = EntryRecord>,
    {
        self.write(|current| {
            if let Some(existing) = current
                .versions
                .values()
                .find(|data| data.version.id != version.id && data.version.overlaps(&version))
            {
                return Err(StandardsError::OverlappingVersion {
                    version: version.id.clone(),
                    existing: existing.version.id.clone(),
                });
            }

            let registry = Registry::load(version.id.clone(), sections, entries)?;
            let mut next = current.clone();
            if let Some(previous) = next.versions.get(&version.id) {
                if !previous.jurisdictions.is_empty() {
                    warn!(
                        version = %version.id,
                        dropped = previous.jurisdictions.len(),
                        "replacing version drops its jurisdiction registries"
                    );
                }
                let before = next.correlations.len();
                next.correlations
                    .retain(|(from, to), _| *from != version.id && *to != version.id);
                if next.correlations.len() < before {
                    warn!(
                        version = %version.id,
                        dropped = before - next.correlations.len(),
                        "replacing version drops its correlation tables"
                    );
                }
            }
            next.versions.insert(
                version.id.clone(),
                Arc::new(VersionData {
                    version,
                    registry,
                    jurisdictions: BTreeMap::new(),
                }),
            );
            Ok(next)
        })
    }

    /// Load (or replace) national lines of `jurisdiction` for a loaded version.
    pub fn ingest_jurisdiction<E>(
        &self,
        version: &VersionId,
        jurisdiction: impl Into<Jurisdiction>,
        entries: E,
    ) -> Result<()>
    where
        E: IntoIterator<Item = EntryRecord>,
    {
        let jurisdiction = jurisdiction.into();
        self.write(|current| {
            let data = current.version(version)?;
            let national = JurisdictionRegistry::load(&data.registry, jurisdiction.clone(), entries)?;
            let mut updated = data.clone();
            updated.jurisdictions.insert(jurisdiction, Arc::new(national));
            let mut next = current.clone();
            next.versions.insert(version.clone(), Arc::new(updated));
            Ok(next)
        })
    }

    /// Load (or replace) the directed `from -> to` correlation table.
    pub fn ingest_correlations<R>(&self, from: &VersionId, to: &VersionId, records: R) -> Result<()>
    where
        R: IntoIterator<Item = CorrelationRecord>,
    {
        self.write(|current| {
            let table =
                CorrelationTable::load(current.registry(from)?, current.registry(to)?, records)?;
            let mut next = current.clone();
            next.correlations
                .insert((from.clone(), to.clone()), Arc::new(table));
            Ok(next)
        })
    }

    /// Pin the current version regardless of today's date.
    pub fn set_current(&self, version: &VersionId) -> Result<()> {
        self.write(|current| {
            current.version(version)?;
            let mut next = current.clone();
            next.pinned = Some(version.clone());
            info!(version = %version, "current version pinned");
            Ok(next)
        })
    }

    fn write<F>(&self, build: F) -> Result<()>
    where
        F: FnOnce(&Snapshot) -> Result<Snapshot>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        match build(&current) {
            Ok(next) => {
                *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "ingestion rejected; previous data stays visible");
                Err(error)
            }
        }
    }
}
