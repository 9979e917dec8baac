//! Role policy: votable roles, thresholds and vote weights

use super::validation::{PolicyIssue, PolicyIssueCode, Severity};
use crate::request::ballot::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Threshold applied to every built-in votable role
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.9;

/// Weight of a voter holding no weighted role
pub const DEFAULT_VOTE_WEIGHT: u64 = 1;

/// Rules for resolving, weighing and judging role requests.
///
/// # Example
///
/// ```
/// use role_quorum_domain::RolePolicy;
///
/// let policy = RolePolicy::default();
/// assert_eq!(policy.resolve_role("Requesting expert please"), Some("Expert"));
/// assert_eq!(policy.resolve_role("Can I be a moderator?"), None);
///
/// assert_eq!(policy.vote_weight(&["Paragon", "Adept"], false), 4);
/// assert_eq!(policy.vote_weight(&["Paragon"], true), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePolicy {
    /// Roles that can be requested, in priority order for title matching
    pub votable_roles: Vec<String>,
    /// Role -> fraction of weighted yes votes required (0.0 to 1.0)
    pub thresholds: BTreeMap<String, f64>,
    /// Roles whose votes all count as the default weight
    pub ignore_vote_weight: Vec<String>,
    /// Held role -> weight class of that holder's vote
    pub vote_weights: BTreeMap<String, u64>,
    /// Weight of a voter holding none of `vote_weights`
    pub default_vote_weight: u64,
    /// Roles allowed to end, veto or delete requests
    pub moderator_roles: Vec<String>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        let votable_roles: Vec<String> = ["Adept", "Expert", "Paragon", "Artisan", "Visionary"]
            .into_iter()
            .map(String::from)
            .collect();

        let thresholds = votable_roles
            .iter()
            .map(|role| (role.clone(), DEFAULT_ACCEPTANCE_THRESHOLD))
            .collect();

        let vote_weights = [
            ("Excelsior", DEFAULT_VOTE_WEIGHT),
            ("Adept", 2),
            ("Expert", 3),
            ("Paragon", 4),
        ]
        .into_iter()
        .map(|(role, weight)| (role.to_string(), weight))
        .collect();

        Self {
            votable_roles,
            thresholds,
            ignore_vote_weight: vec!["Artisan".to_string(), "Visionary".to_string()],
            vote_weights,
            default_vote_weight: DEFAULT_VOTE_WEIGHT,
            moderator_roles: vec![
                "Custodian (admin)".to_string(),
                "Sentinel (mod)".to_string(),
                "Paragon".to_string(),
            ],
        }
    }
}

impl RolePolicy {
    /// Find the role a request title asks for.
    ///
    /// Scans `votable_roles` in order and returns the first one that occurs
    /// anywhere in the title, ignoring case. A title naming several roles
    /// resolves to whichever comes first in the list, not the longest match.
    pub fn resolve_role(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.votable_roles
            .iter()
            .filter(|role| !role.is_empty())
            .find(|role| title.contains(&role.to_lowercase()))
            .map(String::as_str)
    }

    /// Look up a votable role by name, ignoring case, returning its canonical spelling
    pub fn canonical_role(&self, role: &str) -> Option<&str> {
        self.votable_roles
            .iter()
            .find(|r| r.eq_ignore_ascii_case(role.trim()))
            .map(String::as_str)
    }

    /// Exact-match membership in `votable_roles`
    pub fn is_votable(&self, role: &str) -> bool {
        self.votable_roles.iter().any(|r| r == role)
    }

    /// Acceptance threshold for a role, if configured
    pub fn threshold(&self, role: &str) -> Option<f64> {
        self.thresholds.get(role).copied()
    }

    pub fn ignores_vote_weight(&self, role: &str) -> bool {
        self.ignore_vote_weight.iter().any(|r| r == role)
    }

    /// Weight class of a voter holding `holder_roles`.
    ///
    /// The highest weight among the voter's roles wins, and never drops below
    /// `default_vote_weight`. When the request ignores vote weight every voter
    /// gets the default.
    pub fn vote_weight<S: AsRef<str>>(&self, holder_roles: &[S], ignore_weight: bool) -> u64 {
        if ignore_weight {
            return self.default_vote_weight;
        }

        holder_roles
            .iter()
            .filter_map(|role| self.vote_weights.get(role.as_ref()))
            .copied()
            .fold(self.default_vote_weight, u64::max)
    }

    /// Encode a direction and weight class as one signed weight
    pub fn signed_weight(direction: Direction, weight: u64) -> i64 {
        let magnitude = i64::try_from(weight).unwrap_or(i64::MAX);
        match direction {
            Direction::Yes => magnitude,
            Direction::No => -magnitude,
        }
    }

    /// Whether any of `holder_roles` grants restricted operations
    pub fn can_moderate<S: AsRef<str>>(&self, holder_roles: &[S]) -> bool {
        holder_roles
            .iter()
            .any(|held| self.moderator_roles.iter().any(|m| m == held.as_ref()))
    }

    /// Check the policy for values that would misbehave at vote time
    pub fn validate(&self) -> Vec<PolicyIssue> {
        let mut issues = Vec::new();

        if self.votable_roles.is_empty() {
            issues.push(PolicyIssue {
                severity: Severity::Error,
                code: PolicyIssueCode::NoVotableRoles,
                message: "no votable roles configured; every request will be rejected"
                    .to_string(),
            });
        }

        for role in &self.votable_roles {
            if role.trim().is_empty() {
                issues.push(PolicyIssue {
                    severity: Severity::Error,
                    code: PolicyIssueCode::EmptyRoleName,
                    message: "votable role names cannot be empty".to_string(),
                });
                continue;
            }

            match self.threshold(role) {
                None => issues.push(PolicyIssue {
                    severity: Severity::Error,
                    code: PolicyIssueCode::MissingThreshold { role: role.clone() },
                    message: format!("votable role '{}' has no acceptance threshold", role),
                }),
                Some(t) if t == 0.0 => issues.push(PolicyIssue {
                    severity: Severity::Warning,
                    code: PolicyIssueCode::ZeroThreshold { role: role.clone() },
                    message: format!(
                        "role '{}' has a 0% threshold; a request with no votes will be approved",
                        role
                    ),
                }),
                Some(_) => {}
            }
        }

        for (role, threshold) in &self.thresholds {
            if !(0.0..=1.0).contains(threshold) {
                issues.push(PolicyIssue {
                    severity: Severity::Error,
                    code: PolicyIssueCode::ThresholdOutOfRange { role: role.clone() },
                    message: format!(
                        "threshold {} for role '{}' is outside 0.0..=1.0",
                        threshold, role
                    ),
                });
            }
        }

        for role in self.ignore_vote_weight.iter().filter(|r| !self.is_votable(r)) {
            issues.push(PolicyIssue {
                severity: Severity::Warning,
                code: PolicyIssueCode::UnknownIgnoreWeightRole { role: role.clone() },
                message: format!(
                    "ignore_vote_weight lists '{}', which is not a votable role",
                    role
                ),
            });
        }

        if self.default_vote_weight == 0 {
            issues.push(PolicyIssue {
                severity: Severity::Warning,
                code: PolicyIssueCode::ZeroDefaultWeight,
                message: "default_vote_weight is 0; unweighted voters will not count".to_string(),
            });
        }

        issues
    }
}
