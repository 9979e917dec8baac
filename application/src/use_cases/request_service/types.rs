//! Input/output types for [`RequestService`](super::RequestService).

use crate::ports::state_store::StoreError;
use role_quorum_domain::{
    Direction, DomainError, MessageId, RequestId, RequestOutcome, RoleRequest, Tally, UserId,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while handling a request operation
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("User {voter} has no vote on request {request} to cancel")]
    NoVoteToCancel { request: RequestId, voter: UserId },

    #[error("User {voter} has already submitted feedback on request {request}")]
    FeedbackAlreadySubmitted { request: RequestId, voter: UserId },

    #[error("The requester cannot end their own request ({0})")]
    SelfModeration(RequestId),

    #[error("User {0} does not hold a moderator role")]
    NotModerator(UserId),

    #[error("Failed to persist state: {0}")]
    Persistence(#[from] StoreError),

    /// The request was decided and closed in memory, but the save failed.
    #[error("Request {} was closed but its state could not be saved: {source}", .verdict.request_id)]
    UnsavedVerdict {
        verdict: Box<Verdict>,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Check if the addressed request is not active
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_not_found())
    }

    /// Check if this error was caused by the caller rather than by state or I/O
    pub fn is_user_error(&self) -> bool {
        match self {
            ServiceError::Domain(e) => !e.is_invariant_violation(),
            ServiceError::Persistence(_) | ServiceError::UnsavedVerdict { .. } => false,
            _ => true,
        }
    }

    /// The decision carried by this error, if the request was closed anyway
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            ServiceError::UnsavedVerdict { verdict, .. } => Some(verdict.as_ref()),
            _ => None,
        }
    }
}

/// Outcome of one [`sweep`](super::RequestService::sweep) pass.
///
/// `verdicts` holds every request the pass closed, including those whose
/// save failed; those also appear in `failures`.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub verdicts: Vec<Verdict>,
    pub failures: Vec<(RequestId, ServiceError)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty() && self.failures.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of casting a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CastVote {
    pub direction: Direction,
    /// Weight actually recorded
    pub weight: u64,
    /// The vote this one replaced, if the voter had already voted
    pub replaced: Option<(Direction, u64)>,
}

impl CastVote {
    pub fn is_update(&self) -> bool {
        self.replaced.is_some()
    }
}

/// How a moderator ends a vote early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EarlyOutcome {
    /// Force approval
    Approve,
    /// Force denial
    Deny,
    /// End now and let the votes decide
    Abstain,
}

impl EarlyOutcome {
    /// The veto this outcome imposes, if any
    pub fn forced(&self) -> Option<bool> {
        match self {
            EarlyOutcome::Approve => Some(true),
            EarlyOutcome::Deny => Some(false),
            EarlyOutcome::Abstain => None,
        }
    }
}

impl std::fmt::Display for EarlyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EarlyOutcome::Approve => write!(f, "Approve"),
            EarlyOutcome::Deny => write!(f, "Deny"),
            EarlyOutcome::Abstain => write!(f, "Abstain"),
        }
    }
}

impl std::str::FromStr for EarlyOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Ok(EarlyOutcome::Approve),
            "deny" => Ok(EarlyOutcome::Deny),
            "abstain" => Ok(EarlyOutcome::Abstain),
            other => Err(format!(
                "Unknown outcome: {}. Valid: approve, deny, abstain",
                other
            )),
        }
    }
}

/// Final decision on a closed request, handed to whatever grants roles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub request_id: RequestId,
    pub requester: UserId,
    pub role: String,
    pub outcome: RequestOutcome,
    pub tally: Tally,
    pub participants: usize,
    /// Moderator whose veto decided the outcome
    pub vetoed_by: Option<UserId>,
    /// Prompt message to update with the result
    pub prompt: Option<MessageId>,
}

impl Verdict {
    pub fn from_request(request: &RoleRequest) -> Self {
        Self {
            request_id: request.id(),
            requester: request.requester(),
            role: request.role().to_string(),
            outcome: request.outcome(),
            tally: request.tally(),
            participants: request.participant_count(),
            vetoed_by: request.veto().map(|v| v.overrider),
            prompt: request.prompt(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.outcome.is_approved()
    }
}
