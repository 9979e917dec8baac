//! JSON file state store.
//!
//! The whole registry is written on every save. Writes go to a sibling
//! `*.tmp` file that is then renamed over the target, so a crash mid-write
//! leaves the previous state intact.

use role_quorum_application::ports::state_store::{StateStore, StoreError};
use role_quorum_domain::RegistrySnapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default state file name, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "requests_state.json";

/// [`StateStore`] backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for JsonFileStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("State file {} does not exist", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            debug!("State file {} is empty", self.path.display());
            return Ok(None);
        }

        RegistrySnapshot::from_json(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(
            "Saved {} active and {} closed requests to {}",
            snapshot.requests.len(),
            snapshot.closed_requests.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use role_quorum_domain::{NewRequest, RequestId, RequestRegistry, RolePolicy, UserId};

    fn snapshot_with_one_request() -> RegistrySnapshot {
        let mut registry = RequestRegistry::new();
        registry
            .add(
                NewRequest::new(UserId::new(1), RequestId::new(42), "Expert please", 100),
                &RolePolicy::default(),
            )
            .unwrap();
        registry.vote(RequestId::new(42), UserId::new(2), 3).unwrap();
        registry.snapshot()
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_blank_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "\n  \n").unwrap();
        assert!(JsonFileStateStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ \"requests\": ").unwrap();

        let err = JsonFileStateStore::new(path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("data").join("state.json"));
        let snapshot = snapshot_with_one_request();

        store.save(&snapshot).unwrap();
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_saved_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));
        store.save(&snapshot_with_one_request()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let record = &value["requests"]["42"];
        assert_eq!(record["role"], "Expert");
        assert_eq!(record["yes_votes"], serde_json::json!([[2, 3]]));
        assert!(value["closed_requests"].is_object());
    }

    #[test]
    fn test_loads_legacy_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"42": {"user_id": 1, "thread_id": 42, "title": "Adept", "end_time": 1.5,
                "bot_message_id": 9, "yes_votes": [], "no_votes": [], "veto": null}}"#,
        )
        .unwrap();

        let snapshot = JsonFileStateStore::new(path).load().unwrap().unwrap();
        assert_eq!(snapshot.requests[&RequestId::new(42)].end_time, 1);
        assert!(snapshot.closed_requests.is_empty());
    }
}
