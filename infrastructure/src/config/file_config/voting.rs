//! Vote timing configuration from TOML (`[voting]` section)

use role_quorum_application::VotingParams;
use role_quorum_application::config::voting_params::{
    DEFAULT_CHECK_INTERVAL, DEFAULT_VOTING_PERIOD,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw voting configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVotingConfig {
    /// How long a request stays open, in seconds
    pub period_seconds: u64,
    /// Seconds between expiry sweeps in `watch` mode
    pub check_interval_seconds: u64,
}

impl Default for FileVotingConfig {
    fn default() -> Self {
        Self {
            period_seconds: DEFAULT_VOTING_PERIOD.as_secs(),
            check_interval_seconds: DEFAULT_CHECK_INTERVAL.as_secs(),
        }
    }
}

impl FileVotingConfig {
    pub fn to_params(&self) -> VotingParams {
        VotingParams::default()
            .with_period(Duration::from_secs(self.period_seconds))
            .with_check_interval(Duration::from_secs(self.check_interval_seconds))
    }
}
