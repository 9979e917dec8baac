//! State store port
//!
//! Defines where the registry snapshot is persisted between runs.

use role_quorum_domain::RegistrySnapshot;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while loading or saving state
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence for the full registry state.
///
/// Every call to [`save`](StateStore::save) replaces the previous state in
/// full; there are no partial writes. Implementations live in the
/// infrastructure layer.
pub trait StateStore: Send + Sync {
    /// Load the last saved state. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError>;

    /// Replace the stored state with `snapshot`
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError>;
}

/// In-memory store for tests and for running without a state file
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    snapshot: Mutex<Option<RegistrySnapshot>>,
    saves: Mutex<usize>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing state
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// The most recently saved state
    pub fn current(&self) -> Option<RegistrySnapshot> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        Ok(self.current())
    }

    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.snapshot.lock() {
            *slot = Some(snapshot.clone());
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
