//! Infrastructure layer for role-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileRolesConfig,
    FileStorageConfig, FileVotingConfig,
};
pub use logging::JsonlAuditLogger;
pub use storage::{DEFAULT_STATE_FILE, JsonFileStateStore};
