//! Dataset directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable overriding the dataset directory.
pub const DATA_DIR_ENV_VAR: &str = "HS_DATA_DIR";

/// Manifest file name at the dataset root.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Resolve the dataset root.
///
/// Resolution order:
/// 1. an explicit path (the CLI's `--data-dir`)
/// 2. `HS_DATA_DIR` environment variable
/// 3. `data/` relative to the working directory
pub fn data_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(root) = std::env::var(DATA_DIR_ENV_VAR)
        && !root.trim().is_empty()
    {
        return PathBuf::from(root);
    }
    PathBuf::from("data")
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}
