//! Final outcome of a role request

use serde::{Deserialize, Serialize};

/// Outcome of a role request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOutcome {
    /// The role should be granted
    Approved,
    /// The role should not be granted
    Denied,
}

impl RequestOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, RequestOutcome::Approved)
    }
}

impl From<bool> for RequestOutcome {
    fn from(approved: bool) -> Self {
        if approved {
            RequestOutcome::Approved
        } else {
            RequestOutcome::Denied
        }
    }
}

impl std::fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestOutcome::Approved => write!(f, "Approved"),
            RequestOutcome::Denied => write!(f, "Denied"),
        }
    }
}
