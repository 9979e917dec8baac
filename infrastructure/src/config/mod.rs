//! Configuration file loading for role-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ROLE_QUORUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./role-quorum.toml` or `./.role-quorum.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/role-quorum/config.toml`
//! 5. Fallback: `~/.config/role-quorum/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FileRolesConfig, FileStorageConfig,
    FileVotingConfig,
};
pub use loader::ConfigLoader;
