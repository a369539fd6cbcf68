#![deny(unsafe_code)]

//! Versioned HS nomenclature data.
//!
//! Registries, national extensions and correlation tables are bulk-loaded
//! into a [`NomenclatureStore`], either directly from records or from a
//! manifest-verified dataset directory via [`Dataset::verify_and_load`].

pub mod correlation;
pub mod csv_utils;
pub mod dataset;
pub mod doctor;
pub mod error;
pub mod hash;
pub mod jurisdiction;
pub mod loaders;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod store;

pub use crate::correlation::CorrelationTable;
pub use crate::dataset::{CorrelationSummary, Dataset, VerifySummary, VersionSummary};
pub use crate::doctor::DoctorReport;
pub use crate::error::{Result, StandardsError};
pub use crate::jurisdiction::JurisdictionRegistry;
pub use crate::paths::{DATA_DIR_ENV_VAR, data_root};
pub use crate::registry::{Registry, RegistryStats};
pub use crate::store::{NomenclatureStore, Snapshot, VersionData};
