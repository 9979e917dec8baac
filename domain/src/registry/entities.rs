//! In-memory registry of active and closed role requests

use super::snapshot::{RegistrySnapshot, RestoreReport, SkippedRecord};
use crate::core::error::DomainError;
use crate::core::ids::{MessageId, RequestId, Timestamp, UserId};
use crate::policy::RolePolicy;
use crate::request::{NewRequest, RequestRecord, RoleRequest};
use std::collections::BTreeMap;

/// Owned store of role requests.
///
/// `active` holds one entry per open request. `closed` keeps every request
/// that was closed under a given id, oldest first, so a thread that was
/// voted on twice has two history entries.
///
/// The registry does no I/O; callers persist [`snapshot`](Self::snapshot)
/// after each mutation.
///
/// # Example
///
/// ```
/// use role_quorum_domain::{NewRequest, RequestId, RequestRegistry, RolePolicy, UserId};
///
/// let policy = RolePolicy::default();
/// let mut registry = RequestRegistry::new();
/// let id = registry
///     .add(NewRequest::new(UserId::new(1), RequestId::new(10), "Adept", 0), &policy)
///     .unwrap();
///
/// registry.vote(id, UserId::new(2), 2).unwrap();
/// registry.close(id).unwrap();
///
/// assert!(registry.get(id).is_none());
/// assert!(registry.history(id).last().unwrap().is_closed());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestRegistry {
    active: BTreeMap<RequestId, RoleRequest>,
    closed: BTreeMap<RequestId, Vec<RoleRequest>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a request.
    ///
    /// Fails with [`DomainError::DuplicateRequest`] when the id is already
    /// active, and propagates role resolution errors. Nothing is registered
    /// on failure.
    pub fn add(&mut self, draft: NewRequest, policy: &RolePolicy) -> Result<RequestId, DomainError> {
        if self.active.contains_key(&draft.id) {
            return Err(DomainError::DuplicateRequest(draft.id));
        }

        let request = RoleRequest::create(draft, policy)?;
        let id = request.id();
        self.active.insert(id, request);
        Ok(id)
    }

    pub fn set_prompt(&mut self, id: RequestId, message: MessageId) -> Result<(), DomainError> {
        self.active_mut(id)?.set_prompt(message)
    }

    /// Cast or change a vote on an active request
    pub fn vote(
        &mut self,
        id: RequestId,
        voter: UserId,
        signed_weight: i64,
    ) -> Result<(), DomainError> {
        self.active_mut(id)?.cast_or_change_vote(voter, signed_weight);
        Ok(())
    }

    /// Withdraw a vote. `Ok(false)` means the voter had not voted.
    pub fn cancel_vote(&mut self, id: RequestId, voter: UserId) -> Result<bool, DomainError> {
        Ok(self.active_mut(id)?.cancel_vote(voter))
    }

    pub fn submit_feedback(
        &mut self,
        id: RequestId,
        voter: UserId,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.active_mut(id)?.submit_feedback(voter, text);
        Ok(())
    }

    pub fn set_veto(
        &mut self,
        id: RequestId,
        overrider: UserId,
        approve: bool,
    ) -> Result<(), DomainError> {
        self.active_mut(id)?.set_veto(overrider, approve);
        Ok(())
    }

    pub fn get(&self, id: RequestId) -> Option<&RoleRequest> {
        self.active.get(&id)
    }

    /// Closed requests for `id`, oldest first (empty if none)
    pub fn history(&self, id: RequestId) -> &[RoleRequest] {
        self.closed.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The active request for `id`, or else the most recently closed one
    pub fn latest(&self, id: RequestId) -> Option<&RoleRequest> {
        self.get(id).or_else(|| self.history(id).last())
    }

    /// Delete an active request without archiving it
    pub fn remove(&mut self, id: RequestId) -> Result<RoleRequest, DomainError> {
        self.active.remove(&id).ok_or(DomainError::NotFound(id))
    }

    /// Mark an active request closed and move it to the end of its history
    pub fn close(&mut self, id: RequestId) -> Result<&RoleRequest, DomainError> {
        let mut request = self.active.remove(&id).ok_or(DomainError::NotFound(id))?;
        request.mark_closed();

        let history = self.closed.entry(id).or_default();
        history.push(request);
        Ok(&history[history.len() - 1])
    }

    /// Ids of active requests whose deadline has passed
    pub fn expired(&self, now: Timestamp) -> Vec<RequestId> {
        self.active
            .values()
            .filter(|r| r.is_expired(now))
            .map(RoleRequest::id)
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &RoleRequest> {
        self.active.values()
    }

    /// Number of active requests
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of closed requests across all ids
    pub fn closed_len(&self) -> usize {
        self.closed.values().map(Vec::len).sum()
    }

    fn active_mut(&mut self, id: RequestId) -> Result<&mut RoleRequest, DomainError> {
        self.active.get_mut(&id).ok_or(DomainError::NotFound(id))
    }

    // ==================== Persistence ====================

    /// Serializable copy of the full state
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            requests: self
                .active
                .iter()
                .map(|(id, r)| (*id, r.to_record()))
                .collect(),
            closed_requests: self
                .closed
                .iter()
                .map(|(id, history)| (*id, history.iter().map(RoleRequest::to_record).collect()))
                .collect(),
        }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// Records that cannot be migrated are skipped and listed in the report
    /// instead of failing the whole restore.
    pub fn restore(snapshot: RegistrySnapshot, policy: &RolePolicy, now: Timestamp) -> RestoreReport {
        let mut registry = Self::new();
        let mut skipped = Vec::new();

        for (id, record) in snapshot.requests {
            match restore_one(id, record, policy, now) {
                Ok(request) => {
                    registry.active.insert(id, request);
                }
                Err(error) => skipped.push(SkippedRecord {
                    id,
                    closed: false,
                    error,
                }),
            }
        }

        for (id, records) in snapshot.closed_requests {
            let mut history = Vec::with_capacity(records.len());
            for record in records {
                match restore_one(id, record, policy, now) {
                    Ok(mut request) => {
                        request.mark_closed();
                        history.push(request);
                    }
                    Err(error) => skipped.push(SkippedRecord {
                        id,
                        closed: true,
                        error,
                    }),
                }
            }
            if !history.is_empty() {
                registry.closed.insert(id, history);
            }
        }

        RestoreReport { registry, skipped }
    }
}

/// Migrate one stored record, rejecting it if it is filed under another id
fn restore_one(
    key: RequestId,
    record: RequestRecord,
    policy: &RolePolicy,
    now: Timestamp,
) -> Result<RoleRequest, DomainError> {
    let request = RoleRequest::from_record(record, policy, now)?;
    if request.id() != key {
        return Err(DomainError::IdMismatch {
            key,
            found: request.id(),
        });
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Tally;

    const NOW: Timestamp = 1_700_000_000;

    fn policy() -> RolePolicy {
        RolePolicy::default()
    }

    fn draft(id: u64, title: &str) -> NewRequest {
        NewRequest::new(UserId::new(1), RequestId::new(id), title, NOW + 100)
    }

    fn registry_with(id: u64) -> RequestRegistry {
        let mut registry = RequestRegistry::new();
        registry.add(draft(id, "Expert"), &policy()).unwrap();
        registry
    }

    #[test]
    fn test_add_returns_id() {
        let mut registry = RequestRegistry::new();
        let id = registry.add(draft(10, "Adept"), &policy()).unwrap();
        assert_eq!(id, RequestId::new(10));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().role(), "Adept");
    }

    #[test]
    fn test_add_invalid_role_registers_nothing() {
        let mut registry = RequestRegistry::new();
        let err = registry.add(draft(10, "hello"), &policy()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRole(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_duplicate_rejected_without_clobbering() {
        let mut registry = registry_with(10);
        registry.vote(RequestId::new(10), UserId::new(2), 3).unwrap();

        let err = registry.add(draft(10, "Paragon"), &policy()).unwrap_err();
        assert_eq!(err, DomainError::DuplicateRequest(RequestId::new(10)));

        let request = registry.get(RequestId::new(10)).unwrap();
        assert_eq!(request.role(), "Expert");
        assert_eq!(request.tally(), Tally::new(3, 0));
    }

    #[test]
    fn test_operations_on_missing_id() {
        let mut registry = RequestRegistry::new();
        let id = RequestId::new(404);
        assert!(registry.vote(id, UserId::new(1), 1).unwrap_err().is_not_found());
        assert!(registry.cancel_vote(id, UserId::new(1)).unwrap_err().is_not_found());
        assert!(registry
            .submit_feedback(id, UserId::new(1), "hi")
            .unwrap_err()
            .is_not_found());
        assert!(registry.set_prompt(id, MessageId::new(1)).unwrap_err().is_not_found());
        assert!(registry.set_veto(id, UserId::new(1), true).unwrap_err().is_not_found());
        assert!(registry.remove(id).unwrap_err().is_not_found());
        assert!(registry.close(id).unwrap_err().is_not_found());
        assert!(registry.get(id).is_none());
        assert!(registry.history(id).is_empty());
    }

    #[test]
    fn test_cancel_vote_reports_absence() {
        let mut registry = registry_with(10);
        let id = RequestId::new(10);
        assert!(!registry.cancel_vote(id, UserId::new(2)).unwrap());
        registry.vote(id, UserId::new(2), -1).unwrap();
        assert!(registry.cancel_vote(id, UserId::new(2)).unwrap());
    }

    #[test]
    fn test_close_moves_to_history() {
        let mut registry = registry_with(10);
        let id = RequestId::new(10);
        registry.vote(id, UserId::new(2), 4).unwrap();

        let closed = registry.close(id).unwrap();
        assert!(closed.is_closed());
        assert_eq!(closed.tally(), Tally::new(4, 0));

        assert!(registry.get(id).is_none());
        let history = registry.history(id);
        assert_eq!(history.len(), 1);
        assert!(history[0].is_closed());
    }

    #[test]
    fn test_reopened_thread_accumulates_history() {
        let mut registry = registry_with(10);
        let id = RequestId::new(10);
        registry.close(id).unwrap();

        registry.add(draft(10, "Paragon"), &policy()).unwrap();
        assert_eq!(registry.latest(id).unwrap().role(), "Paragon");
        registry.close(id).unwrap();

        let roles: Vec<_> = registry.history(id).iter().map(|r| r.role()).collect();
        assert_eq!(roles, vec!["Expert", "Paragon"]);
        assert_eq!(registry.latest(id).unwrap().role(), "Paragon");
        assert_eq!(registry.closed_len(), 2);
    }

    #[test]
    fn test_remove_keeps_no_history() {
        let mut registry = registry_with(10);
        let id = RequestId::new(10);
        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(registry.get(id).is_none());
        assert!(registry.history(id).is_empty());
    }

    #[test]
    fn test_expired() {
        let mut registry = RequestRegistry::new();
        registry
            .add(NewRequest::new(UserId::new(1), RequestId::new(1), "Adept", NOW - 1), &policy())
            .unwrap();
        registry
            .add(NewRequest::new(UserId::new(1), RequestId::new(2), "Adept", NOW + 1), &policy())
            .unwrap();

        assert_eq!(registry.expired(NOW), vec![RequestId::new(1)]);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut registry = registry_with(10);
        registry.add(draft(11, "Artisan"), &policy()).unwrap();
        registry.vote(RequestId::new(10), UserId::new(5), -3).unwrap();
        registry
            .submit_feedback(RequestId::new(10), UserId::new(5), "soon")
            .unwrap();
        registry.close(RequestId::new(11)).unwrap();

        let report = RequestRegistry::restore(registry.snapshot(), &policy(), NOW);
        assert!(report.skipped.is_empty());
        assert_eq!(report.registry, registry);
    }

    #[test]
    fn test_restore_skips_unmigratable_records() {
        let mut snapshot = registry_with(10).snapshot();
        let mut bad = snapshot.requests[&RequestId::new(10)].clone();
        bad.thread_id = RequestId::new(20);
        bad.role = Some("Retired".to_string());
        bad.acceptance_threshold = None;
        snapshot.requests.insert(RequestId::new(20), bad);

        let report = RequestRegistry::restore(snapshot, &policy(), NOW);
        assert_eq!(report.registry.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, RequestId::new(20));
        assert!(!report.skipped[0].closed);
    }

    #[test]
    fn test_restore_skips_records_under_foreign_key() {
        let mut snapshot = registry_with(10).snapshot();
        let misfiled = snapshot.requests[&RequestId::new(10)].clone();
        snapshot.requests.insert(RequestId::new(30), misfiled.clone());
        snapshot
            .closed_requests
            .insert(RequestId::new(31), vec![misfiled]);

        let report = RequestRegistry::restore(snapshot, &policy(), NOW);
        assert_eq!(report.registry.len(), 1);
        assert!(report.registry.get(RequestId::new(30)).is_none());
        assert!(report.registry.history(RequestId::new(31)).is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            report.skipped[0].error,
            DomainError::IdMismatch {
                key: RequestId::new(30),
                found: RequestId::new(10),
            }
        );
        assert!(report.skipped[1].closed);
    }
}
