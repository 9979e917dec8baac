//! Structured issues found while validating a [`RolePolicy`](super::RolePolicy).

/// Severity level of a policy issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: requests for the affected role cannot be judged.
    Error,
    /// Non-fatal: the policy works but may not behave as expected.
    Warning,
}

/// Identifies a specific policy issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyIssueCode {
    /// The votable role list is empty.
    NoVotableRoles,
    /// A votable role name is blank and would match every title.
    EmptyRoleName,
    /// A votable role has no threshold entry.
    MissingThreshold { role: String },
    /// A threshold is below 0 or above 1.
    ThresholdOutOfRange { role: String },
    /// A votable role approves with zero votes cast.
    ZeroThreshold { role: String },
    /// An ignore-weight role is not votable, so the entry never applies.
    UnknownIgnoreWeightRole { role: String },
    /// Voters without a weighted role carry no weight.
    ZeroDefaultWeight,
}

/// A detected issue in the role policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyIssue {
    pub severity: Severity,
    pub code: PolicyIssueCode,
    pub message: String,
}

impl PolicyIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
