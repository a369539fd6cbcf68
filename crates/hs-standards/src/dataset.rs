#![deny(unsafe_code)]

//! Manifest-verified dataset loading.
//!
//! [`Dataset::verify_and_load`] checks the manifest schema, roles, paths and
//! every SHA-256 digest, parses all CSV files, and only then ingests them
//! into a fresh [`NomenclatureStore`]. Nothing is returned on failure.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use hs_model::{CorrelationRecord, EntryRecord, Jurisdiction, SectionRecord, VersionId};
use tracing::{debug, info};

use crate::error::{Result, StandardsError};
use crate::hash::sha256_hex;
use crate::loaders::{
    parse_correlation_csv, parse_national_csv, parse_nomenclature_csv, parse_sections_csv,
};
use crate::manifest::{
    FileRole, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestFile, ManifestVersion,
};
use crate::paths::{MANIFEST_FILE, manifest_path};
use crate::registry::RegistryStats;
use crate::store::NomenclatureStore;

const ALLOWED_KINDS: &[&str] = &["csv", "md", "txt", "other"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionSummary {
    pub id: VersionId,
    pub label: Option<String>,
    pub effective_from: chrono::NaiveDate,
    pub effective_to: Option<chrono::NaiveDate>,
    pub pinned: bool,
    pub stats: RegistryStats,
    /// National line counts per jurisdiction.
    pub jurisdictions: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CorrelationSummary {
    pub from: VersionId,
    pub to: VersionId,
    pub sources: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub data_dir: PathBuf,
    pub file_count: usize,
    pub versions: Vec<VersionSummary>,
    pub correlations: Vec<CorrelationSummary>,
}

/// A verified dataset: its manifest and the store built from it.
#[derive(Debug)]
pub struct Dataset {
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub store: NomenclatureStore,
}

struct ParsedVersion {
    pin: ManifestVersion,
    entries: Vec<EntryRecord>,
    national: Vec<(Jurisdiction, Vec<EntryRecord>)>,
}

impl Dataset {
    pub fn verify_and_load(data_dir: &Path) -> Result<(Self, VerifySummary)> {
        let manifest = load_manifest(&manifest_path(data_dir))?;
        validate_manifest(&manifest, data_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        for file in &files {
            verify_file(data_dir, file)?;
        }
        debug!(files = files.len(), "manifest digests verified");

        let sections_file = role_file(&files, FileRole::Sections)?;
        let sections = parse_sections_csv(&data_dir.join(&sections_file.path))?;
        let versions = parse_versions(&manifest, &files, data_dir)?;
        let correlations = parse_correlations(&files, data_dir)?;

        let store = NomenclatureStore::new();
        ingest(&store, &sections, versions, correlations)?;

        let summary = summarize(data_dir, files.len(), &store);
        info!(
            data_dir = %data_dir.display(),
            versions = summary.versions.len(),
            correlations = summary.correlations.len(),
            "dataset loaded"
        );
        Ok((
            Self {
                manifest,
                files,
                store,
            },
            summary,
        ))
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, data_dir: &Path) -> Result<()> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }
    if manifest.versions.is_empty() {
        return Err(StandardsError::InvalidManifest {
            message: "no versions declared".to_string(),
        });
    }

    let mut declared: BTreeSet<&VersionId> = BTreeSet::new();
    for version in &manifest.versions {
        if !declared.insert(&version.id) {
            return Err(StandardsError::InvalidManifest {
                message: format!("version {} declared twice", version.id),
            });
        }
        if version
            .effective_to
            .is_some_and(|end| end <= version.effective_from)
        {
            return Err(StandardsError::InvalidManifest {
                message: format!("version {} ends before it starts", version.id),
            });
        }
    }
    if manifest.versions.iter().filter(|v| v.current).count() > 1 {
        return Err(StandardsError::InvalidManifest {
            message: "more than one version is marked current".to_string(),
        });
    }

    let mut slots: BTreeSet<String> = BTreeSet::new();
    let mut manifest_paths: BTreeSet<PathBuf> = BTreeSet::new();
    for file in &manifest.files {
        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(StandardsError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        let path = validate_path(&file.path)?;
        if !manifest_paths.insert(normalize_path(&path)) {
            return Err(StandardsError::InvalidManifest {
                message: format!("{} listed twice", file.path),
            });
        }

        let slot = file_slot(file, &declared)?;
        if let Some(slot) = slot
            && !slots.insert(slot.clone())
        {
            return Err(StandardsError::InvalidManifest {
                message: format!("duplicate {slot}"),
            });
        }
    }

    if !slots.contains(FileRole::Sections.as_str()) {
        return Err(StandardsError::MissingRole {
            role: FileRole::Sections.as_str().to_string(),
        });
    }
    for version in &manifest.versions {
        if !slots.contains(&format!("nomenclature {}", version.id)) {
            return Err(StandardsError::MissingRole {
                role: format!("nomenclature for {}", version.id),
            });
        }
    }

    for path in list_files_under(data_dir)? {
        if path == Path::new(MANIFEST_FILE) {
            continue;
        }
        if !manifest_paths.contains(&normalize_path(&path)) {
            return Err(StandardsError::UnexpectedFile {
                path: data_dir.join(path),
            });
        }
    }

    Ok(())
}

/// Key that must be unique across the manifest, checking role attributes.
fn file_slot(file: &ManifestFile, declared: &BTreeSet<&VersionId>) -> Result<Option<String>> {
    let require_version = |field: &str, value: Option<&VersionId>| -> Result<VersionId> {
        let version = value.ok_or_else(|| StandardsError::InvalidManifest {
            message: format!("{} needs a '{field}' version", file.path),
        })?;
        if !declared.contains(version) {
            return Err(StandardsError::InvalidManifest {
                message: format!("{} references undeclared version {version}", file.path),
            });
        }
        Ok(version.clone())
    };

    let slot = match file.role {
        FileRole::Sections => Some(FileRole::Sections.as_str().to_string()),
        FileRole::Nomenclature => {
            let version = require_version("version", file.version.as_ref())?;
            Some(format!("nomenclature {version}"))
        }
        FileRole::National => {
            let version = require_version("version", file.version.as_ref())?;
            let jurisdiction = file
                .jurisdiction
                .as_deref()
                .map(Jurisdiction::new)
                .filter(|j| !j.as_str().is_empty())
                .ok_or_else(|| StandardsError::InvalidManifest {
                    message: format!("{} needs a jurisdiction", file.path),
                })?;
            Some(format!("national {version} {jurisdiction}"))
        }
        FileRole::Correlation => {
            let from = require_version("from", file.from.as_ref())?;
            let to = require_version("to", file.to.as_ref())?;
            if from == to {
                return Err(StandardsError::InvalidManifest {
                    message: format!("{} correlates {from} with itself", file.path),
                });
            }
            Some(format!("correlation {from} -> {to}"))
        }
        FileRole::Other => None,
    };
    Ok(slot)
}

fn verify_file(data_dir: &Path, file: &ManifestFile) -> Result<()> {
    let full_path = data_dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            StandardsError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    Ok(())
}

fn role_file(files: &[ManifestFile], role: FileRole) -> Result<&ManifestFile> {
    files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.as_str().to_string(),
        })
}

fn parse_versions(
    manifest: &Manifest,
    files: &[ManifestFile],
    data_dir: &Path,
) -> Result<Vec<ParsedVersion>> {
    let mut parsed = Vec::new();
    for pin in &manifest.versions {
        let of_version = |f: &&ManifestFile| f.version.as_ref() == Some(&pin.id);
        let nomenclature = files
            .iter()
            .filter(of_version)
            .find(|f| f.role == FileRole::Nomenclature)
            .ok_or_else(|| StandardsError::MissingRole {
                role: format!("nomenclature for {}", pin.id),
            })?;
        let entries = parse_nomenclature_csv(&data_dir.join(&nomenclature.path))?;

        let mut national = Vec::new();
        for file in files
            .iter()
            .filter(of_version)
            .filter(|f| f.role == FileRole::National)
        {
            let jurisdiction = Jurisdiction::new(file.jurisdiction.as_deref().unwrap_or_default());
            national.push((jurisdiction, parse_national_csv(&data_dir.join(&file.path))?));
        }
        parsed.push(ParsedVersion {
            pin: pin.clone(),
            entries,
            national,
        });
    }
    parsed.sort_by_key(|v| v.pin.effective_from);
    Ok(parsed)
}

fn parse_correlations(
    files: &[ManifestFile],
    data_dir: &Path,
) -> Result<Vec<(VersionId, VersionId, Vec<CorrelationRecord>)>> {
    files
        .iter()
        .filter(|f| f.role == FileRole::Correlation)
        .filter_map(|f| Some((f, f.from.clone()?, f.to.clone()?)))
        .map(|(file, from, to)| -> Result<_> {
            Ok((from, to, parse_correlation_csv(&data_dir.join(&file.path))?))
        })
        .collect()
}

fn ingest(
    store: &NomenclatureStore,
    sections: &[SectionRecord],
    versions: Vec<ParsedVersion>,
    correlations: Vec<(VersionId, VersionId, Vec<CorrelationRecord>)>,
) -> Result<()> {
    let mut pinned = None;
    for version in versions {
        let id = version.pin.id.clone();
        store.ingest_version(version.pin.to_version(), sections.to_vec(), version.entries)?;
        for (jurisdiction, records) in version.national {
            store.ingest_jurisdiction(&id, jurisdiction, records)?;
        }
        if version.pin.current {
            pinned = Some(id);
        }
    }
    for (from, to, records) in correlations {
        store.ingest_correlations(&from, &to, records)?;
    }
    if let Some(id) = pinned {
        store.set_current(&id)?;
    }
    Ok(())
}

fn summarize(data_dir: &Path, file_count: usize, store: &NomenclatureStore) -> VerifySummary {
    let snapshot = store.snapshot();
    let versions = snapshot
        .versions()
        .into_iter()
        .map(|data| VersionSummary {
            id: data.version.id.clone(),
            label: data.version.label.clone(),
            effective_from: data.version.effective_from,
            effective_to: data.version.effective_to,
            pinned: snapshot.pinned() == Some(&data.version.id),
            stats: data.registry.stats(),
            jurisdictions: data
                .jurisdictions
                .iter()
                .map(|(j, registry)| (j.to_string(), registry.len()))
                .collect(),
        })
        .collect();
    let correlations = snapshot
        .correlation_pairs()
        .filter_map(|(from, to)| {
            let table = snapshot.correlation(from, to)?;
            Some(CorrelationSummary {
                from: from.clone(),
                to: to.clone(),
                sources: table.len(),
            })
        })
        .collect();
    VerifySummary {
        data_dir: data_dir.to_path_buf(),
        file_count,
        versions,
        correlations,
    }
}

fn validate_sha(sha: &str, path: &str) -> Result<()> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StandardsError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf> {
    if path.contains('\\') {
        return Err(StandardsError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of the data directory".to_string(),
        });
    }
    Ok(p)
}

fn list_files_under(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = BTreeSet::new();

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| StandardsError::io(&dir, e))? {
            let entry = entry.map_err(|e| StandardsError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .map_err(|e| StandardsError::InvalidPath {
                        path: path.clone(),
                        message: format!("failed to relativize path: {e}"),
                    })?
                    .to_path_buf();
                files.insert(rel);
            }
        }
    }

    Ok(files)
}

fn normalize_path(p: &Path) -> PathBuf {
    p.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
