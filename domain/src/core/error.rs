//! Domain error types

use super::ids::RequestId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No votable role could be resolved from the title or explicit role.
    #[error("Invalid role: no votable role found in '{0}'")]
    InvalidRole(String),

    /// A votable role has no acceptance threshold configured.
    #[error("No acceptance threshold configured for role '{0}'")]
    MissingThreshold(String),

    #[error("No active request with id {0}")]
    NotFound(RequestId),

    #[error("A request with id {0} is already active")]
    DuplicateRequest(RequestId),

    #[error("Prompt message for request {0} has already been set")]
    PromptAlreadySet(RequestId),

    /// A stored record sits under a key that is not its own id.
    #[error("Record for request {found} is stored under id {key}")]
    IdMismatch { key: RequestId, found: RequestId },
}

impl DomainError {
    /// Check if this error is a lookup miss on the active set
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    /// Check if this error means the configuration and the domain disagree,
    /// rather than a user supplying bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            DomainError::MissingThreshold(_) | DomainError::IdMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = DomainError::NotFound(RequestId::new(42));
        assert_eq!(error.to_string(), "No active request with id 42");
    }

    #[test]
    fn test_is_not_found_check() {
        assert!(DomainError::NotFound(RequestId::new(1)).is_not_found());
        assert!(!DomainError::DuplicateRequest(RequestId::new(1)).is_not_found());
        assert!(!DomainError::InvalidRole("Member".to_string()).is_not_found());
    }

    #[test]
    fn test_invariant_violation_check() {
        assert!(DomainError::MissingThreshold("Adept".to_string()).is_invariant_violation());
        assert!(!DomainError::InvalidRole("Adept?".to_string()).is_invariant_violation());
        assert!(
            DomainError::IdMismatch {
                key: RequestId::new(1),
                found: RequestId::new(2),
            }
            .is_invariant_violation()
        );
    }
}
