//! Code validation against a store snapshot.
//!
//! ## Policy
//!
//! - **Format** (no version needed): non-digits, fewer than 6 digits, more
//!   than 12 digits, or a reserved chapter → fatal, checked in that order,
//!   first failure wins
//! - **Length** ≥ 10 digits → `UnusualLength` warning, never fatal
//! - **Existence** (`check_existence`): the 6-digit subheading must be
//!   registered in the version → else `NotFound`
//! - **Jurisdiction**: extension digits with a jurisdiction need that
//!   jurisdiction's registry → else `JurisdictionUnsupported`; with
//!   `check_existence` the full line must be registered there
//! - **Version**: any registry check without a loaded version (none given
//!   and none current, or the given one unloaded) → `VersionUnsupported`

use std::sync::Arc;

use hs_model::{Code, ErrorKind, Jurisdiction, Level, ValidationResult, VersionId};
use hs_standards::{NomenclatureStore, Snapshot, VersionData};
use serde::Serialize;
use tracing::debug;

/// What to validate against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateOptions {
    /// Target version; `None` means the store's current version.
    pub version: Option<VersionId>,
    pub jurisdiction: Option<Jurisdiction>,
    pub check_existence: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            version: None,
            jurisdiction: None,
            check_existence: true,
        }
    }
}

impl ValidateOptions {
    pub fn for_version(version: impl Into<VersionId>) -> Self {
        Self {
            version: Some(version.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_jurisdiction(mut self, jurisdiction: impl Into<Jurisdiction>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    /// Format checks only.
    #[must_use]
    pub fn format_only(mut self) -> Self {
        self.check_existence = false;
        self
    }
}

/// Validates raw codes against one snapshot of the store.
#[derive(Debug, Clone)]
pub struct Validator {
    snapshot: Arc<Snapshot>,
}

impl Validator {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn from_store(store: &NomenclatureStore) -> Self {
        Self::new(store.snapshot())
    }

    /// Verdict for one raw code. Failures are reported in the result, never
    /// as an `Err`.
    pub fn validate(&self, raw: &str, options: &ValidateOptions) -> ValidationResult {
        let resolved = options
            .version
            .clone()
            .or_else(|| self.snapshot.current().map(|data| data.id().clone()));
        // Format checks need no version; an unresolved one only matters
        // once a registry is consulted.
        let version = resolved.clone().unwrap_or_else(|| VersionId::new(""));

        let parsed = match &options.jurisdiction {
            Some(jurisdiction) => Code::parse_for(raw, version, jurisdiction.clone()),
            None => Code::parse(raw, version),
        };
        let code = match parsed {
            Ok(code) => code,
            Err(error) => {
                debug!(input = raw, %error, "format check failed");
                return ValidationResult::new(raw, None, vec![error.kind()], Vec::new());
            }
        };

        let warnings = code.warnings();
        let needs_jurisdiction = options.jurisdiction.is_some() && code.has_extension();
        let errors = if options.check_existence || needs_jurisdiction {
            match resolved.as_ref().map(|id| self.snapshot.version(id)) {
                Some(Ok(data)) => registry_errors(data, &code, options),
                Some(Err(_)) | None => vec![ErrorKind::VersionUnsupported],
            }
        } else {
            Vec::new()
        };
        if !errors.is_empty() {
            debug!(input = raw, version = %code.version(), ?errors, "registry check failed");
        }
        ValidationResult::new(raw, Some(code), errors, warnings)
    }

    /// One verdict per input, in input order.
    pub fn validate_batch<I, S>(&self, raws: I, options: &ValidateOptions) -> Vec<ValidationResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raws.into_iter()
            .map(|raw| self.validate(raw.as_ref(), options))
            .collect()
    }
}

fn registry_errors(data: &VersionData, code: &Code, options: &ValidateOptions) -> Vec<ErrorKind> {
    let mut errors = Vec::new();
    if options.check_existence
        && !data
            .registry
            .lookup(code.subheading())
            .is_ok_and(|entry| entry.level == Level::Subheading)
    {
        errors.push(ErrorKind::NotFound);
    }
    if let Some(jurisdiction) = code.jurisdiction()
        && code.has_extension()
    {
        match data.jurisdiction(jurisdiction) {
            Err(_) => errors.push(ErrorKind::JurisdictionUnsupported),
            Ok(national) => {
                if options.check_existence
                    && !national.exists(code.digits())
                    && !errors.contains(&ErrorKind::NotFound)
                {
                    errors.push(ErrorKind::NotFound);
                }
            }
        }
    }
    errors
}
