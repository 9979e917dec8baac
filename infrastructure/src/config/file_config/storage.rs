//! State storage configuration from TOML (`[storage]` section)

use crate::storage::DEFAULT_STATE_FILE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// JSON document holding active and closed requests
    pub state_file: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}
