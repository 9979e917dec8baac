//! Request service use case
//!
//! Wraps the [`RequestRegistry`] with the things a host needs around it:
//! write-through persistence, audit events, vote weight lookup and the
//! moderator rules for ending a vote.
//!
//! # Lifecycle
//!
//! ```text
//! open ──▶ vote / cancel / feedback / veto ──▶ finalize (decide + close)
//!   │                                     └──▶ remove (hard delete)
//!   └── deadline passes ──▶ sweep ──▶ finalize
//! ```
//!
//! Every successful mutation saves the full snapshot before returning. The
//! service is single-writer: callers must not mutate the same request from
//! two places at once.

mod types;

pub use types::{CastVote, EarlyOutcome, ServiceError, SweepReport, Verdict};

use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::state_store::StateStore;
use role_quorum_domain::{
    Direction, DomainError, MessageId, NewRequest, RequestId, RequestRegistry, RolePolicy,
    RoleRequest, Timestamp, UserId,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Use case for managing role requests and their votes
pub struct RequestService<S: StateStore> {
    registry: RequestRegistry,
    policy: RolePolicy,
    store: S,
    audit: Arc<dyn AuditLogger>,
}

impl<S: StateStore> RequestService<S> {
    /// Create a service with an empty registry
    pub fn new(store: S, policy: RolePolicy) -> Self {
        Self {
            registry: RequestRegistry::new(),
            policy,
            store,
            audit: Arc::new(NoAuditLogger),
        }
    }

    /// Create a service from whatever the store holds.
    ///
    /// A missing, empty or unreadable store starts an empty registry with a
    /// warning; loading never fails.
    pub fn load(store: S, policy: RolePolicy, now: Timestamp) -> Self {
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!("No saved request state found. Starting fresh.");
                Default::default()
            }
            Err(e) => {
                warn!("Could not load request state, starting fresh: {}", e);
                Default::default()
            }
        };

        let report = RequestRegistry::restore(snapshot, &policy, now);
        for skipped in &report.skipped {
            warn!(
                "Skipping {} request {} from saved state: {}",
                if skipped.closed { "closed" } else { "active" },
                skipped.id,
                skipped.error
            );
        }
        info!(
            "Loaded {} active and {} closed requests",
            report.registry.len(),
            report.registry.closed_len()
        );

        Self {
            registry: report.registry,
            policy,
            store,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit = logger;
        self
    }

    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==================== Queries ====================

    pub fn get(&self, id: RequestId) -> Option<&RoleRequest> {
        self.registry.get(id)
    }

    pub fn history(&self, id: RequestId) -> &[RoleRequest] {
        self.registry.history(id)
    }

    pub fn latest(&self, id: RequestId) -> Option<&RoleRequest> {
        self.registry.latest(id)
    }

    /// Fail unless `holder_roles` includes a moderator role
    pub fn ensure_moderator<R: AsRef<str>>(
        &self,
        user: UserId,
        holder_roles: &[R],
    ) -> Result<(), ServiceError> {
        if self.policy.can_moderate(holder_roles) {
            Ok(())
        } else {
            Err(ServiceError::NotModerator(user))
        }
    }

    // ==================== Mutations ====================

    /// Open a new request
    pub fn open(&mut self, draft: NewRequest) -> Result<RequestId, ServiceError> {
        let id = self.registry.add(draft, &self.policy)?;
        self.persist()?;

        if let Some(request) = self.registry.get(id) {
            info!(
                "Opened request {} for role {} (threshold {})",
                id,
                request.role(),
                request.acceptance_threshold()
            );
            self.audit.log(AuditEvent::new(
                "request_opened",
                json!({
                    "request_id": id,
                    "requester": request.requester(),
                    "title": request.title(),
                    "role": request.role(),
                    "deadline": request.deadline(),
                }),
            ));
        }
        Ok(id)
    }

    pub fn set_prompt(&mut self, id: RequestId, message: MessageId) -> Result<(), ServiceError> {
        self.registry.set_prompt(id, message)?;
        self.persist()?;
        debug!("Request {} prompt set to message {}", id, message);
        Ok(())
    }

    /// Vote with the weight class granted by `holder_roles`
    pub fn vote<R: AsRef<str>>(
        &mut self,
        id: RequestId,
        voter: UserId,
        holder_roles: &[R],
        direction: Direction,
    ) -> Result<CastVote, ServiceError> {
        let request = self
            .registry
            .get(id)
            .ok_or(DomainError::NotFound(id))?;
        let weight = self
            .policy
            .vote_weight(holder_roles, request.ignores_vote_weight());
        self.vote_signed(id, voter, RolePolicy::signed_weight(direction, weight))
    }

    /// Vote with an explicit signed weight (negative is no)
    pub fn vote_signed(
        &mut self,
        id: RequestId,
        voter: UserId,
        signed_weight: i64,
    ) -> Result<CastVote, ServiceError> {
        let replaced = self.registry.get(id).and_then(|r| r.vote_of(voter));
        self.registry.vote(id, voter, signed_weight)?;
        self.persist()?;

        let direction = Direction::from_signed(signed_weight);
        let weight = self
            .registry
            .get(id)
            .and_then(|r| r.vote_of(voter))
            .map(|(_, w)| w)
            .unwrap_or_default();

        debug!(
            "User {} voted {} ({}) on request {}{}",
            voter,
            direction,
            weight,
            id,
            if replaced.is_some() { ", replacing earlier vote" } else { "" }
        );
        self.audit.log(AuditEvent::new(
            "vote_cast",
            json!({
                "request_id": id,
                "voter": voter,
                "direction": direction,
                "weight": weight,
                "replaced": replaced.is_some(),
            }),
        ));

        Ok(CastVote {
            direction,
            weight,
            replaced,
        })
    }

    /// Withdraw a vote; fails if the voter has not voted
    pub fn cancel_vote(&mut self, id: RequestId, voter: UserId) -> Result<(), ServiceError> {
        if !self.registry.cancel_vote(id, voter)? {
            return Err(ServiceError::NoVoteToCancel { request: id, voter });
        }
        self.persist()?;

        debug!("User {} cancelled their vote on request {}", voter, id);
        self.audit.log(AuditEvent::new(
            "vote_cancelled",
            json!({ "request_id": id, "voter": voter }),
        ));
        Ok(())
    }

    /// Add feedback; each voter may submit once per request
    pub fn submit_feedback(
        &mut self,
        id: RequestId,
        voter: UserId,
        text: impl Into<String>,
    ) -> Result<(), ServiceError> {
        let request = self
            .registry
            .get(id)
            .ok_or(DomainError::NotFound(id))?;
        if request.has_submitted_feedback(voter) {
            return Err(ServiceError::FeedbackAlreadySubmitted { request: id, voter });
        }

        let text = text.into();
        let length = text.chars().count();
        self.registry.submit_feedback(id, voter, text)?;
        self.persist()?;

        debug!("User {} left feedback on request {}", voter, id);
        self.audit.log(AuditEvent::new(
            "feedback_submitted",
            json!({ "request_id": id, "voter": voter, "length": length }),
        ));
        Ok(())
    }

    /// Force the outcome of a request without ending it
    pub fn set_veto(
        &mut self,
        id: RequestId,
        moderator: UserId,
        approve: bool,
    ) -> Result<(), ServiceError> {
        self.guard_self_moderation(id, moderator)?;
        self.registry.set_veto(id, moderator, approve)?;
        self.persist()?;

        info!(
            "Moderator {} vetoed request {}: {}",
            moderator,
            id,
            if approve { "approve" } else { "deny" }
        );
        self.audit.log(AuditEvent::new(
            "veto_set",
            json!({ "request_id": id, "moderator": moderator, "approve": approve }),
        ));
        Ok(())
    }

    /// End a vote before its deadline.
    ///
    /// `Approve` and `Deny` record a veto first; `Abstain` leaves the votes
    /// to decide. The requester can never end their own request.
    pub fn end_early(
        &mut self,
        id: RequestId,
        moderator: UserId,
        outcome: EarlyOutcome,
    ) -> Result<Verdict, ServiceError> {
        self.guard_self_moderation(id, moderator)?;
        if let Some(approve) = outcome.forced() {
            self.registry.set_veto(id, moderator, approve)?;
        }
        info!("Request {} ended early by {} ({})", id, moderator, outcome);
        self.finalize(id)
    }

    /// Decide a request and move it to history.
    ///
    /// The request is closed even if the save fails; the error then carries
    /// the verdict so the decision is not lost.
    pub fn finalize(&mut self, id: RequestId) -> Result<Verdict, ServiceError> {
        let verdict = Verdict::from_request(self.registry.close(id)?);

        info!(
            "Request {} closed: {} ({}, {} participants)",
            id, verdict.outcome, verdict.tally, verdict.participants
        );
        self.audit.log(AuditEvent::new(
            "request_closed",
            json!({
                "request_id": id,
                "role": verdict.role,
                "outcome": verdict.outcome,
                "yes": verdict.tally.yes,
                "no": verdict.tally.no,
                "participants": verdict.participants,
                "vetoed_by": verdict.vetoed_by,
            }),
        ));

        match self.persist() {
            Ok(()) => Ok(verdict),
            Err(ServiceError::Persistence(source)) => Err(ServiceError::UnsavedVerdict {
                verdict: Box::new(verdict),
                source,
            }),
            Err(e) => Err(e),
        }
    }

    /// Delete an active request without keeping any history
    pub fn remove(&mut self, id: RequestId) -> Result<RoleRequest, ServiceError> {
        let removed = self.registry.remove(id)?;
        self.persist()?;

        warn!("Request {} was removed without a decision", id);
        self.audit.log(AuditEvent::new(
            "request_removed",
            json!({ "request_id": id, "role": removed.role() }),
        ));
        Ok(removed)
    }

    /// Finalize every active request whose deadline has passed.
    ///
    /// Each request is finalized on its own; a failure on one does not stop
    /// the rest.
    pub fn sweep(&mut self, now: Timestamp) -> SweepReport {
        let expired = self.registry.expired(now);
        if expired.is_empty() {
            debug!("No expired requests");
            return SweepReport::default();
        }

        info!("Finalizing {} expired requests", expired.len());
        let mut report = SweepReport::default();
        for id in expired {
            match self.finalize(id) {
                Ok(verdict) => report.verdicts.push(verdict),
                Err(ServiceError::UnsavedVerdict { verdict, source }) => {
                    report.verdicts.push(*verdict);
                    report.failures.push((id, ServiceError::Persistence(source)));
                }
                Err(e) => report.failures.push((id, e)),
            }
        }
        report
    }

    // ==================== Helpers ====================

    fn guard_self_moderation(&self, id: RequestId, moderator: UserId) -> Result<(), ServiceError> {
        let request = self
            .registry
            .get(id)
            .ok_or(DomainError::NotFound(id))?;
        if request.requester() == moderator {
            return Err(ServiceError::SelfModeration(id));
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), ServiceError> {
        self.store.save(&self.registry.snapshot()).map_err(|e| {
            warn!("Failed to save request state: {}", e);
            ServiceError::Persistence(e)
        })
    }
}
