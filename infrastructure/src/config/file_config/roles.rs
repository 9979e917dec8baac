//! Role policy configuration from TOML (`[roles]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [roles]
//! votable = ["Adept", "Expert", "Paragon", "Artisan", "Visionary"]
//! default_threshold = 0.9
//! ignore_vote_weight = ["Artisan", "Visionary"]
//! default_vote_weight = 1
//! moderators = ["Custodian (admin)", "Sentinel (mod)", "Paragon"]
//!
//! [roles.thresholds]
//! Paragon = 0.95
//!
//! [roles.vote_weights]
//! Excelsior = 1
//! Adept = 2
//! Expert = 3
//! Paragon = 4
//! ```

use role_quorum_domain::RolePolicy;
use role_quorum_domain::policy::DEFAULT_ACCEPTANCE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw role policy configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRolesConfig {
    /// Requestable roles, in title matching order
    pub votable: Vec<String>,
    /// Threshold for votable roles not listed in `thresholds`
    pub default_threshold: f64,
    /// Per-role threshold overrides
    pub thresholds: BTreeMap<String, f64>,
    /// Roles whose votes all count as `default_vote_weight`
    pub ignore_vote_weight: Vec<String>,
    /// Held role -> weight class
    pub vote_weights: BTreeMap<String, u64>,
    /// Weight of voters holding none of `vote_weights`
    pub default_vote_weight: u64,
    /// Roles allowed to veto, end or remove requests
    pub moderators: Vec<String>,
}

impl Default for FileRolesConfig {
    fn default() -> Self {
        let policy = RolePolicy::default();
        Self {
            votable: policy.votable_roles,
            default_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            thresholds: BTreeMap::new(),
            ignore_vote_weight: policy.ignore_vote_weight,
            vote_weights: policy.vote_weights,
            default_vote_weight: policy.default_vote_weight,
            moderators: policy.moderator_roles,
        }
    }
}

impl FileRolesConfig {
    /// Build the domain policy, filling unlisted thresholds with `default_threshold`
    pub fn to_policy(&self) -> RolePolicy {
        let mut thresholds = self.thresholds.clone();
        for role in &self.votable {
            thresholds
                .entry(role.clone())
                .or_insert(self.default_threshold);
        }

        RolePolicy {
            votable_roles: self.votable.clone(),
            thresholds,
            ignore_vote_weight: self.ignore_vote_weight.clone(),
            vote_weights: self.vote_weights.clone(),
            default_vote_weight: self.default_vote_weight,
            moderator_roles: self.moderators.clone(),
        }
    }
}
