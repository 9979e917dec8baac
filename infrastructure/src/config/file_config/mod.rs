//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types by the `to_*` methods.

mod logging;
mod roles;
mod storage;
mod voting;

pub use logging::FileLoggingConfig;
pub use roles::FileRolesConfig;
pub use storage::FileStorageConfig;
pub use voting::FileVotingConfig;

use role_quorum_domain::PolicyIssue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors that prevent the engine from starting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("invalid role policy: {0}")]
    InvalidPolicy(String),

    #[error("voting.period_seconds cannot be 0")]
    ZeroPeriod,

    #[error("voting.check_interval_seconds cannot be 0")]
    ZeroCheckInterval,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Votable roles, thresholds and vote weights
    pub roles: FileRolesConfig,
    /// Vote timing
    pub voting: FileVotingConfig,
    /// Where request state is kept
    pub storage: FileStorageConfig,
    /// Diagnostic and audit log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration.
    ///
    /// Returns the first fatal error, or the non-fatal policy warnings the
    /// caller should report.
    pub fn validate(&self) -> Result<Vec<PolicyIssue>, ConfigValidationError> {
        if self.voting.period_seconds == 0 {
            return Err(ConfigValidationError::ZeroPeriod);
        }
        if self.voting.check_interval_seconds == 0 {
            return Err(ConfigValidationError::ZeroCheckInterval);
        }

        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .roles
            .to_policy()
            .validate()
            .into_iter()
            .partition(PolicyIssue::is_error);

        match errors.first() {
            Some(issue) => Err(ConfigValidationError::InvalidPolicy(issue.message.clone())),
            None => Ok(warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use role_quorum_domain::RolePolicy;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[roles]
votable = ["Adept", "Expert"]
ignore_vote_weight = ["Adept"]
moderators = ["Admin"]
default_vote_weight = 2

[roles.thresholds]
Adept = 0.75
Expert = 0.8

[roles.vote_weights]
Expert = 5

[voting]
period_seconds = 3600
check_interval_seconds = 10

[storage]
state_file = "/var/lib/role-quorum/state.json"

[logging]
file = "role-quorum.log"
audit_file = "audit.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let policy = config.roles.to_policy();
        assert_eq!(policy.votable_roles, vec!["Adept", "Expert"]);
        assert_eq!(policy.threshold("Adept"), Some(0.75));
        assert!(policy.ignores_vote_weight("Adept"));
        assert_eq!(policy.vote_weight(&["Expert"], false), 5);
        assert_eq!(policy.vote_weight(&["Nobody"], false), 2);
        assert!(policy.can_moderate(&["Admin"]));

        let params = config.voting.to_params();
        assert_eq!(params.period, Duration::from_secs(3600));
        assert_eq!(params.check_interval, Duration::from_secs(10));

        assert_eq!(
            config.storage.state_file.to_string_lossy(),
            "/var/lib/role-quorum/state.json"
        );
        assert!(config.logging.file.is_some());
        assert!(config.logging.audit_file.is_some());
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[voting]
period_seconds = 60
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voting.period_seconds, 60);
        // Defaults should apply
        assert_eq!(config.voting.check_interval_seconds, 50);
        assert_eq!(config.roles.to_policy(), RolePolicy::default());
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FileConfig::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_timing() {
        let mut config = FileConfig::default();
        config.voting.check_interval_seconds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroCheckInterval)
        );

        config.voting.period_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroPeriod));
    }

    #[test]
    fn test_validate_policy_errors_and_warnings() {
        let toml_str = r#"
[roles.thresholds]
Adept = 1.5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPolicy(_))
        ));

        let toml_str = r#"
[roles.thresholds]
Adept = 0.0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
    }
}
