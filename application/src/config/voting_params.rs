//! Voting parameters — timing of the vote lifecycle.
//!
//! [`VotingParams`] controls how long a vote stays open and how often the host
//! checks for expired votes. These are application-layer concerns, not domain
//! policy: the domain only stores the resulting deadline.

use role_quorum_domain::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default voting period: 7 days
pub const DEFAULT_VOTING_PERIOD: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Default interval between expiry sweeps
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(50);

/// Vote lifecycle timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingParams {
    /// How long a request stays open after it is created.
    pub period: Duration,
    /// How often expired requests are swept.
    pub check_interval: Duration,
}

impl Default for VotingParams {
    fn default() -> Self {
        Self {
            period: DEFAULT_VOTING_PERIOD,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl VotingParams {
    // ==================== Builder Methods ====================

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Deadline of a request opened at `now`
    pub fn deadline_from(&self, now: Timestamp) -> Timestamp {
        let period = i64::try_from(self.period.as_secs()).unwrap_or(i64::MAX);
        now.saturating_add(period)
    }
}
