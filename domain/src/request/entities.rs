//! Role request entity
//!
//! A [`RoleRequest`] is one application for a role: who asked, for what,
//! until when, and the weighted ballot that decides it.

use super::ballot::{Ballot, BallotEntry, Direction, Tally};
use super::outcome::RequestOutcome;
use super::veto::{FeedbackEntry, Veto};
use crate::core::error::DomainError;
use crate::core::ids::{MessageId, RequestId, Timestamp, UserId};
use crate::policy::RolePolicy;

/// Input for creating a role request
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub requester: UserId,
    /// Thread id, which doubles as the request id
    pub id: RequestId,
    pub title: String,
    pub deadline: Timestamp,
    /// Explicit role; resolved from `title` when `None`
    pub role: Option<String>,
}

impl NewRequest {
    pub fn new(
        requester: UserId,
        id: RequestId,
        title: impl Into<String>,
        deadline: Timestamp,
    ) -> Self {
        Self {
            requester,
            id,
            title: title.into(),
            deadline,
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// One open or closed role application.
///
/// # Example
///
/// ```
/// use role_quorum_domain::{NewRequest, RequestId, RolePolicy, RoleRequest, UserId};
///
/// let policy = RolePolicy::default();
/// let draft = NewRequest::new(UserId::new(1), RequestId::new(100), "Adept please", 1_700_000_000);
/// let mut request = RoleRequest::create(draft, &policy).unwrap();
/// assert_eq!(request.role(), "Adept");
///
/// request.cast_or_change_vote(UserId::new(2), 3);
/// request.cast_or_change_vote(UserId::new(2), -2); // replaces the first vote
/// assert_eq!(request.tally().yes, 0);
/// assert_eq!(request.tally().no, 2);
/// assert!(!request.decide());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRequest {
    pub(crate) requester: UserId,
    pub(crate) id: RequestId,
    pub(crate) title: String,
    pub(crate) deadline: Timestamp,
    pub(crate) prompt: Option<MessageId>,
    pub(crate) role: String,
    pub(crate) acceptance_threshold: f64,
    pub(crate) ignore_vote_weight: bool,
    pub(crate) yes_votes: Ballot,
    pub(crate) no_votes: Ballot,
    pub(crate) feedback: Vec<FeedbackEntry>,
    pub(crate) participant_count: usize,
    pub(crate) veto: Option<Veto>,
    pub(crate) closed: bool,
}

impl RoleRequest {
    /// Create a request, resolving its role and freezing the role's rules.
    ///
    /// Fails with [`DomainError::InvalidRole`] when no votable role can be
    /// resolved. An explicit role must name a votable role (case-insensitive).
    pub fn create(draft: NewRequest, policy: &RolePolicy) -> Result<Self, DomainError> {
        let role = match &draft.role {
            Some(explicit) => policy
                .canonical_role(explicit)
                .ok_or_else(|| DomainError::InvalidRole(explicit.clone()))?,
            None => policy
                .resolve_role(&draft.title)
                .ok_or_else(|| DomainError::InvalidRole(draft.title.clone()))?,
        }
        .to_string();

        let acceptance_threshold = policy
            .threshold(&role)
            .ok_or_else(|| DomainError::MissingThreshold(role.clone()))?;
        let ignore_vote_weight = policy.ignores_vote_weight(&role);

        Ok(Self {
            requester: draft.requester,
            id: draft.id,
            title: draft.title,
            deadline: draft.deadline,
            prompt: None,
            role,
            acceptance_threshold,
            ignore_vote_weight,
            yes_votes: Ballot::new(),
            no_votes: Ballot::new(),
            feedback: Vec::new(),
            participant_count: 0,
            veto: None,
            closed: false,
        })
    }

    // ==================== Accessors ====================

    pub fn requester(&self) -> UserId {
        self.requester
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn prompt(&self) -> Option<MessageId> {
        self.prompt
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    pub fn ignores_vote_weight(&self) -> bool {
        self.ignore_vote_weight
    }

    pub fn yes_votes(&self) -> &Ballot {
        &self.yes_votes
    }

    pub fn no_votes(&self) -> &Ballot {
        &self.no_votes
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    /// Number of voters with a live ballot entry
    pub fn participant_count(&self) -> usize {
        self.participant_count
    }

    pub fn veto(&self) -> Option<&Veto> {
        self.veto.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }

    // ==================== Mutations ====================

    /// Record the rendered prompt message. Can only be set once.
    pub fn set_prompt(&mut self, message: MessageId) -> Result<(), DomainError> {
        if self.prompt.is_some() {
            return Err(DomainError::PromptAlreadySet(self.id));
        }
        self.prompt = Some(message);
        Ok(())
    }

    /// Cast a vote, replacing any earlier vote by the same voter.
    ///
    /// The sign of `signed_weight` is the direction (negative is no, zero and
    /// positive are yes) and its magnitude is the weight. Requests that ignore
    /// vote weight store every vote with weight 1.
    pub fn cast_or_change_vote(&mut self, voter: UserId, signed_weight: i64) {
        let direction = Direction::from_signed(signed_weight);
        let weight = if self.ignore_vote_weight {
            1
        } else {
            signed_weight.unsigned_abs()
        };

        self.remove_entry(voter);

        let entry = BallotEntry::new(voter, weight);
        match direction {
            Direction::Yes => self.yes_votes.push(entry),
            Direction::No => self.no_votes.push(entry),
        }
        self.recount();
    }

    /// Withdraw a voter's ballot entry. Returns false when there was none.
    pub fn cancel_vote(&mut self, voter: UserId) -> bool {
        let removed = self.remove_entry(voter);
        self.recount();
        removed
    }

    /// Append feedback. Duplicates are not rejected here; check
    /// [`has_submitted_feedback`](Self::has_submitted_feedback) first.
    pub fn submit_feedback(&mut self, voter: UserId, text: impl Into<String>) {
        self.feedback.push(FeedbackEntry::new(voter, text));
    }

    /// Force the outcome, replacing any earlier veto
    pub fn set_veto(&mut self, overrider: UserId, approve: bool) {
        self.veto = Some(Veto { overrider, approve });
    }

    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }

    fn remove_entry(&mut self, voter: UserId) -> bool {
        let yes = self.yes_votes.remove_voter(voter).is_some();
        let no = self.no_votes.remove_voter(voter).is_some();
        yes || no
    }

    pub(crate) fn recount(&mut self) {
        self.participant_count = self.yes_votes.len() + self.no_votes.len();
    }

    // ==================== Queries ====================

    pub fn has_voted(&self, voter: UserId) -> bool {
        self.yes_votes.contains(voter) || self.no_votes.contains(voter)
    }

    pub fn has_submitted_feedback(&self, voter: UserId) -> bool {
        self.feedback.iter().any(|f| f.author == voter)
    }

    /// The live vote of `voter`, if any
    pub fn vote_of(&self, voter: UserId) -> Option<(Direction, u64)> {
        if let Some(entry) = self.yes_votes.get(voter) {
            return Some((Direction::Yes, entry.weight));
        }
        self.no_votes
            .get(voter)
            .map(|entry| (Direction::No, entry.weight))
    }

    /// All live votes, yes ballot first
    pub fn votes(&self) -> impl Iterator<Item = (Direction, &BallotEntry)> {
        self.yes_votes
            .iter()
            .map(|e| (Direction::Yes, e))
            .chain(self.no_votes.iter().map(|e| (Direction::No, e)))
    }

    /// Weighted sums of both ballots
    pub fn tally(&self) -> Tally {
        Tally::new(self.yes_votes.total_weight(), self.no_votes.total_weight())
    }

    /// Decide whether the role should be granted.
    ///
    /// A veto decides unconditionally. Otherwise the request is approved when
    /// `yes / (yes + no) >= acceptance_threshold`, dividing by 1 when no
    /// weight was cast at all.
    pub fn decide(&self) -> bool {
        if let Some(veto) = &self.veto {
            return veto.approve;
        }
        self.tally().meets(self.acceptance_threshold)
    }

    pub fn outcome(&self) -> RequestOutcome {
        RequestOutcome::from(self.decide())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADLINE: Timestamp = 1_700_000_000;

    fn draft(title: &str) -> NewRequest {
        NewRequest::new(UserId::new(1), RequestId::new(500), title, DEADLINE)
    }

    fn request(title: &str) -> RoleRequest {
        RoleRequest::create(draft(title), &RolePolicy::default()).unwrap()
    }

    fn with_threshold(threshold: f64) -> RoleRequest {
        let mut policy = RolePolicy::default();
        policy.thresholds.insert("Expert".to_string(), threshold);
        RoleRequest::create(draft("Expert"), &policy).unwrap()
    }

    // ==================== Construction ====================

    #[test]
    fn test_create_resolves_role_from_title() {
        let request = request("Requesting the expert role");
        assert_eq!(request.role(), "Expert");
        assert_eq!(request.acceptance_threshold(), 0.9);
        assert!(!request.ignores_vote_weight());
        assert_eq!(request.participant_count(), 0);
        assert!(!request.is_closed());
        assert!(request.veto().is_none());
        assert!(request.prompt().is_none());
    }

    #[test]
    fn test_create_first_priority_role_wins() {
        let request = request("visionary adept");
        assert_eq!(request.role(), "Adept");
    }

    #[test]
    fn test_create_fails_without_role() {
        let result = RoleRequest::create(draft("Please promote me"), &RolePolicy::default());
        assert_eq!(
            result.unwrap_err(),
            DomainError::InvalidRole("Please promote me".to_string())
        );
    }

    #[test]
    fn test_create_with_explicit_role() {
        let request =
            RoleRequest::create(draft("no role here").with_role("artisan"), &RolePolicy::default())
                .unwrap();
        assert_eq!(request.role(), "Artisan");
        assert!(request.ignores_vote_weight());
    }

    #[test]
    fn test_create_rejects_unknown_explicit_role() {
        let result =
            RoleRequest::create(draft("Adept").with_role("Overlord"), &RolePolicy::default());
        assert!(matches!(result, Err(DomainError::InvalidRole(r)) if r == "Overlord"));
    }

    #[test]
    fn test_create_missing_threshold_is_invariant_violation() {
        let mut policy = RolePolicy::default();
        policy.thresholds.remove("Adept");
        let err = RoleRequest::create(draft("Adept"), &policy).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_threshold_frozen_at_creation() {
        let mut policy = RolePolicy::default();
        let request = RoleRequest::create(draft("Adept"), &policy).unwrap();
        policy.thresholds.insert("Adept".to_string(), 0.1);
        assert_eq!(request.acceptance_threshold(), 0.9);
    }

    // ==================== Voting ====================

    #[test]
    fn test_vote_replacement_not_accumulation() {
        let mut request = request("Adept");
        request.cast_or_change_vote(UserId::new(2), 3);
        request.cast_or_change_vote(UserId::new(2), -2);

        assert_eq!(request.tally(), Tally::new(0, 2));
        assert_eq!(request.participant_count(), 1);
        assert_eq!(request.vote_of(UserId::new(2)), Some((Direction::No, 2)));
    }

    #[test]
    fn test_participant_count_tracks_votes_and_cancels() {
        let mut request = request("Adept");
        request.cast_or_change_vote(UserId::new(2), 1);
        request.cast_or_change_vote(UserId::new(3), -4);
        request.cast_or_change_vote(UserId::new(4), 2);
        assert_eq!(request.participant_count(), 3);

        assert!(request.cancel_vote(UserId::new(3)));
        assert_eq!(request.participant_count(), 2);

        assert!(!request.cancel_vote(UserId::new(99)));
        assert_eq!(request.participant_count(), 2);
        assert_eq!(request.tally(), Tally::new(3, 0));
    }

    #[test]
    fn test_zero_weight_counts_as_yes() {
        let mut request = request("Adept");
        request.cast_or_change_vote(UserId::new(2), 0);
        assert!(request.yes_votes().contains(UserId::new(2)));
        assert_eq!(request.tally(), Tally::new(0, 0));
    }

    #[test]
    fn test_ignore_vote_weight_collapses_to_one() {
        let mut request = request("Artisan");
        request.cast_or_change_vote(UserId::new(2), 4);
        request.cast_or_change_vote(UserId::new(3), -3);

        assert_eq!(request.yes_votes().get(UserId::new(2)).unwrap().weight, 1);
        assert_eq!(request.tally(), Tally::new(1, 1));
    }

    #[test]
    fn test_has_voted() {
        let mut request = request("Adept");
        assert!(!request.has_voted(UserId::new(2)));
        request.cast_or_change_vote(UserId::new(2), -1);
        assert!(request.has_voted(UserId::new(2)));
        request.cancel_vote(UserId::new(2));
        assert!(!request.has_voted(UserId::new(2)));
    }

    #[test]
    fn test_votes_iterates_yes_then_no() {
        let mut request = request("Adept");
        request.cast_or_change_vote(UserId::new(3), -1);
        request.cast_or_change_vote(UserId::new(2), 2);

        let votes: Vec<_> = request.votes().map(|(d, e)| (d, e.voter.get())).collect();
        assert_eq!(votes, vec![(Direction::Yes, 2), (Direction::No, 3)]);
    }

    // ==================== Feedback & prompt ====================

    #[test]
    fn test_feedback_is_not_deduplicated() {
        let mut request = request("Adept");
        assert!(!request.has_submitted_feedback(UserId::new(2)));
        request.submit_feedback(UserId::new(2), "great builds");
        request.submit_feedback(UserId::new(2), "also, nice lore");
        assert!(request.has_submitted_feedback(UserId::new(2)));
        assert_eq!(request.feedback().len(), 2);
    }

    #[test]
    fn test_set_prompt_once() {
        let mut request = request("Adept");
        request.set_prompt(MessageId::new(77)).unwrap();
        assert_eq!(request.prompt(), Some(MessageId::new(77)));
        assert_eq!(
            request.set_prompt(MessageId::new(78)),
            Err(DomainError::PromptAlreadySet(RequestId::new(500)))
        );
        assert_eq!(request.prompt(), Some(MessageId::new(77)));
    }

    #[test]
    fn test_is_expired() {
        let request = request("Adept");
        assert!(!request.is_expired(DEADLINE - 1));
        assert!(request.is_expired(DEADLINE));
    }

    // ==================== Decision ====================

    #[test]
    fn test_decide_threshold_tie_approves() {
        let mut request = with_threshold(0.9);
        request.cast_or_change_vote(UserId::new(2), 9);
        request.cast_or_change_vote(UserId::new(3), -1);
        assert!(request.decide());
        assert_eq!(request.outcome(), RequestOutcome::Approved);
    }

    #[test]
    fn test_decide_below_threshold_denies() {
        let mut request = with_threshold(0.9);
        request.cast_or_change_vote(UserId::new(2), 8);
        request.cast_or_change_vote(UserId::new(3), -2);
        assert!(!request.decide());
        assert_eq!(request.outcome(), RequestOutcome::Denied);
    }

    #[test]
    fn test_decide_no_votes() {
        assert!(with_threshold(0.0).decide());
        assert!(!with_threshold(0.5).decide());
    }

    #[test]
    fn test_decide_with_extreme_weights() {
        let mut request = with_threshold(0.9);
        for voter in 2..=4 {
            request.cast_or_change_vote(UserId::new(voter), i64::MAX);
        }
        request.cast_or_change_vote(UserId::new(5), i64::MIN);
        assert_eq!(request.tally().yes, u64::MAX);
        assert_eq!(request.tally().total(), u64::MAX);
        assert!(request.decide());
    }

    #[test]
    fn test_veto_short_circuits() {
        let mut request = with_threshold(0.9);
        request.cast_or_change_vote(UserId::new(2), -1000);
        request.set_veto(UserId::new(8), true);
        assert!(request.decide());

        let mut empty = with_threshold(0.0);
        empty.set_veto(UserId::new(8), false);
        assert!(!empty.decide());
    }

    #[test]
    fn test_decide_is_pure() {
        let mut request = with_threshold(0.5);
        request.cast_or_change_vote(UserId::new(2), 1);
        let before = request.clone();
        assert_eq!(request.decide(), request.decide());
        assert_eq!(request, before);
    }
}
