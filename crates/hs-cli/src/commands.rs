//! Subcommand implementations.
//!
//! Each command returns a serializable report; rendering is left to
//! [`crate::summary`] or `serde_json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use hs_correlate::{Conversion, CorrelationEngine};
use hs_model::{Jurisdiction, RegistryEntry, Section, VersionId};
use hs_search::{SearchCatalog, SearchHit, SearchMode, SearchOptions};
use hs_standards::{Dataset, DoctorReport, Snapshot, VerifySummary, VersionSummary, data_root};
use hs_validate::{ValidateOptions, ValidationResult, ValidationSummary, Validator};
use serde::Serialize;
use tracing::debug;

/// A verified dataset and the snapshot every command of one run reads.
pub struct Session {
    data_dir: PathBuf,
    dataset: Dataset,
    summary: VerifySummary,
    snapshot: Arc<Snapshot>,
}

impl Session {
    /// Verify and load the dataset at `data_dir` (or the default location).
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = data_root(data_dir);
        let (dataset, summary) = Dataset::verify_and_load(&data_dir)
            .with_context(|| format!("load dataset from {}", data_dir.display()))?;
        let snapshot = dataset.store.snapshot();
        Ok(Self {
            data_dir,
            dataset,
            summary,
            snapshot,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// The requested version, else the current one.
    fn resolve_version(&self, version: Option<&str>) -> Result<VersionId> {
        if let Some(raw) = version {
            let id = VersionId::new(raw);
            self.snapshot.version(&id).context("resolve version")?;
            return Ok(id);
        }
        self.snapshot
            .current()
            .map(|data| data.id().clone())
            .ok_or_else(|| anyhow!("no current nomenclature version; pass --version"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub results: Vec<ValidationResult>,
    pub summary: ValidationSummary,
}

impl ValidateReport {
    pub fn has_errors(&self) -> bool {
        self.summary.has_errors()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub version: VersionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
    pub entry: RegistryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    pub ancestors: Vec<RegistryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryList {
    pub version: VersionId,
    pub code: String,
    pub entries: Vec<RegistryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub version: VersionId,
    pub query: String,
    pub mode: SearchMode,
    pub hits: Vec<SearchHit>,
}

/// Parameters for [`run_validate`], mirroring the `validate` flags.
#[derive(Debug, Clone, Default)]
pub struct ValidateRequest<'a> {
    pub version: Option<&'a str>,
    pub jurisdiction: Option<&'a str>,
    pub check_existence: bool,
}

pub fn run_validate(
    session: &Session,
    codes: &[String],
    request: &ValidateRequest<'_>,
) -> ValidateReport {
    let options = ValidateOptions {
        version: request.version.map(VersionId::new),
        jurisdiction: request.jurisdiction.map(Jurisdiction::new),
        check_existence: request.check_existence,
    };
    let validator = Validator::new(Arc::clone(&session.snapshot));
    let results = validator.validate_batch(codes, &options);
    let summary = ValidationSummary::from_results(&results);
    debug!(
        total = summary.total,
        invalid = summary.invalid,
        "validation complete"
    );
    ValidateReport { results, summary }
}

pub fn run_lookup(
    session: &Session,
    code: &str,
    version: Option<&str>,
    jurisdiction: Option<&str>,
) -> Result<LookupReport> {
    let version = session.resolve_version(version)?;
    let data = session.snapshot.version(&version)?;
    let registry = &data.registry;

    let (jurisdiction, entry) = match jurisdiction {
        Some(raw) => {
            let jurisdiction = Jurisdiction::new(raw);
            let entry = data
                .jurisdiction(&jurisdiction)
                .and_then(|national| national.lookup(code))
                .with_context(|| format!("look up {code} in {jurisdiction}"))?;
            (Some(jurisdiction), entry.clone())
        }
        None => {
            let entry = registry
                .lookup(code)
                .with_context(|| format!("look up {code}"))?;
            (None, entry.clone())
        }
    };
    let ancestors = registry
        .ancestors_of(&entry.code)
        .with_context(|| format!("resolve ancestors of {}", entry.code))?
        .into_iter()
        .filter(|ancestor| ancestor.code != entry.code)
        .cloned()
        .collect();
    let section = registry.section_of(&entry.code).cloned();

    Ok(LookupReport {
        version,
        jurisdiction,
        entry,
        section,
        ancestors,
    })
}

pub fn run_children(session: &Session, code: &str, version: Option<&str>) -> Result<EntryList> {
    let version = session.resolve_version(version)?;
    let registry = session.snapshot.registry(&version)?;
    let parent = registry
        .lookup(code)
        .with_context(|| format!("look up {code}"))?;
    let entries = registry.children(&parent.code).cloned().collect();
    Ok(EntryList {
        version,
        code: parent.code.clone(),
        entries,
    })
}

pub fn run_ancestors(session: &Session, code: &str, version: Option<&str>) -> Result<EntryList> {
    let version = session.resolve_version(version)?;
    let registry = session.snapshot.registry(&version)?;
    let entries = registry
        .ancestors_of(code)
        .with_context(|| format!("resolve ancestors of {code}"))?
        .into_iter()
        .cloned()
        .collect();
    Ok(EntryList {
        version,
        code: code.to_string(),
        entries,
    })
}

pub fn run_correlate(
    session: &Session,
    codes: &[String],
    from: &str,
    to: &str,
) -> Result<Vec<Conversion>> {
    let engine = CorrelationEngine::new(Arc::clone(&session.snapshot));
    let from = VersionId::new(from);
    let to = VersionId::new(to);
    codes
        .iter()
        .zip(engine.correlate_batch(codes, &from, &to))
        .map(|(code, result)| result.with_context(|| format!("correlate {code}")))
        .collect()
}

pub fn run_search(
    session: &Session,
    query: &str,
    mut options: SearchOptions,
) -> Result<SearchReport> {
    let version = session.resolve_version(options.version.as_ref().map(VersionId::as_str))?;
    options.version = Some(version.clone());
    let catalog = SearchCatalog::build(Arc::clone(&session.snapshot));
    let hits = catalog
        .search(query, &options)
        .with_context(|| format!("search {query:?}"))?;
    Ok(SearchReport {
        version,
        query: query.to_string(),
        mode: options.mode,
        hits,
    })
}

pub fn run_versions(session: &Session) -> Vec<VersionSummary> {
    session.summary.versions.clone()
}

pub fn run_doctor(session: &Session) -> DoctorReport {
    DoctorReport::from_verify_summary(&session.summary, session.dataset.files.clone())
}
