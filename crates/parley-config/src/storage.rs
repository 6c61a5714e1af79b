use std::path::PathBuf;

use serde::Deserialize;

/// Transcript storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage backend
    #[serde(default, rename = "type")]
    pub storage_type: StorageType,
    /// Directory holding conversation files (file backend only)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Supported storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Process-local storage, lost on exit
    #[default]
    Memory,
    /// One JSON document per conversation on disk
    File,
}
