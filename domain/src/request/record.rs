//! Persisted form of a [`RoleRequest`].
//!
//! Field names match the first state file layout so existing
//! files keep loading. Fields added over time are optional on read:
//!
//! | Field | When missing |
//! |---|---|
//! | `role` | resolved from `title` with the current policy |
//! | `feedback` | empty |
//! | `participant_count` | recomputed from the ballots |
//! | `closed` | `end_time <= now` |
//! | `acceptance_threshold` | looked up in the current policy |
//! | `ignore_vote_weight` | looked up in the current policy |
//!
//! `participant_count` is always recomputed on restore, even when present.

use super::ballot::{Ballot, BallotEntry};
use super::entities::RoleRequest;
use super::veto::{FeedbackEntry, Veto};
use crate::core::error::DomainError;
use crate::core::ids::{MessageId, RequestId, Timestamp, UserId};
use crate::policy::RolePolicy;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Language-neutral record of a role request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub user_id: UserId,
    pub thread_id: RequestId,
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_time: Timestamp,
    #[serde(default)]
    pub bot_message_id: Option<MessageId>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub yes_votes: Vec<BallotEntry>,
    #[serde(default)]
    pub no_votes: Vec<BallotEntry>,
    #[serde(default)]
    pub veto: Option<Veto>,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
    #[serde(default)]
    pub participant_count: Option<usize>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub acceptance_threshold: Option<f64>,
    #[serde(default)]
    pub ignore_vote_weight: Option<bool>,
}

/// Accept integer or fractional epoch seconds; fractions are truncated.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Integer(i64),
        Float(f64),
    }

    Ok(match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Integer(seconds) => seconds,
        RawTimestamp::Float(seconds) => seconds.trunc() as Timestamp,
    })
}

impl RoleRequest {
    /// Convert to the persisted record
    pub fn to_record(&self) -> RequestRecord {
        RequestRecord {
            user_id: self.requester,
            thread_id: self.id,
            title: self.title.clone(),
            end_time: self.deadline,
            bot_message_id: self.prompt,
            role: Some(self.role.clone()),
            yes_votes: self.yes_votes.entries().to_vec(),
            no_votes: self.no_votes.entries().to_vec(),
            veto: self.veto,
            feedback: self.feedback.clone(),
            participant_count: Some(self.participant_count),
            closed: Some(self.closed),
            acceptance_threshold: Some(self.acceptance_threshold),
            ignore_vote_weight: Some(self.ignore_vote_weight),
        }
    }

    /// Rebuild a request from a record, filling fields older records lack.
    ///
    /// `policy` is only consulted for fields the record does not carry, and
    /// `now` decides `closed` for records written before it existed. A voter
    /// listed more than once keeps only their first entry (yes ballot first).
    pub fn from_record(
        record: RequestRecord,
        policy: &RolePolicy,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let role = match record.role {
            Some(role) => role,
            None => policy
                .resolve_role(&record.title)
                .map(str::to_string)
                .ok_or_else(|| DomainError::InvalidRole(record.title.clone()))?,
        };

        let acceptance_threshold = match record.acceptance_threshold {
            Some(threshold) => threshold,
            None => policy
                .threshold(&role)
                .ok_or_else(|| DomainError::MissingThreshold(role.clone()))?,
        };

        let ignore_vote_weight = record
            .ignore_vote_weight
            .unwrap_or_else(|| policy.ignores_vote_weight(&role));

        let mut seen = HashSet::new();
        let yes_votes: Ballot = record
            .yes_votes
            .into_iter()
            .filter(|e| seen.insert(e.voter))
            .collect();
        let no_votes: Ballot = record
            .no_votes
            .into_iter()
            .filter(|e| seen.insert(e.voter))
            .collect();

        let mut request = Self {
            requester: record.user_id,
            id: record.thread_id,
            title: record.title,
            deadline: record.end_time,
            prompt: record.bot_message_id,
            role,
            acceptance_threshold,
            ignore_vote_weight,
            yes_votes,
            no_votes,
            feedback: record.feedback,
            participant_count: 0,
            veto: record.veto,
            closed: record.closed.unwrap_or(record.end_time <= now),
        };
        request.recount();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::entities::NewRequest;

    const NOW: Timestamp = 1_700_000_000;

    fn sample() -> RoleRequest {
        let draft = NewRequest::new(UserId::new(1), RequestId::new(42), "Expert request", NOW + 60);
        let mut request = RoleRequest::create(draft, &RolePolicy::default()).unwrap();
        request.set_prompt(MessageId::new(900)).unwrap();
        request.cast_or_change_vote(UserId::new(2), 3);
        request.cast_or_change_vote(UserId::new(3), -2);
        request.submit_feedback(UserId::new(3), "not yet");
        request.set_veto(UserId::new(4), true);
        request
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let request = sample();
        let json = serde_json::to_string(&request.to_record()).unwrap();
        let record: RequestRecord = serde_json::from_str(&json).unwrap();

        // A policy that disagrees proves stored values win over lookups
        let mut other = RolePolicy::default();
        other.thresholds.insert("Expert".to_string(), 0.1);

        let restored = RoleRequest::from_record(record, &other, NOW).unwrap();
        assert_eq!(restored, request);
        assert_eq!(restored.participant_count(), 2);
    }

    #[test]
    fn test_record_wire_format() {
        let value = serde_json::to_value(sample().to_record()).unwrap();
        assert_eq!(value["user_id"], 1);
        assert_eq!(value["thread_id"], 42);
        assert_eq!(value["yes_votes"], serde_json::json!([[2, 3]]));
        assert_eq!(value["no_votes"], serde_json::json!([[3, 2]]));
        assert_eq!(value["veto"], serde_json::json!([4, true]));
        assert_eq!(value["feedback"], serde_json::json!([[3, "not yet"]]));
        assert_eq!(value["closed"], false);
    }

    #[test]
    fn test_legacy_record_defaults() {
        let json = r#"{
            "user_id": 1,
            "thread_id": 42,
            "title": "Paragon plz",
            "end_time": 1699999999.75,
            "bot_message_id": null,
            "role": "Paragon",
            "yes_votes": [[5, 4], [6, 2]],
            "no_votes": [],
            "veto": null
        }"#;
        let record: RequestRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.end_time, 1_699_999_999);

        let request = RoleRequest::from_record(record, &RolePolicy::default(), NOW).unwrap();
        assert!(request.feedback().is_empty());
        assert_eq!(request.participant_count(), 2);
        assert!(request.is_closed());
        assert_eq!(request.acceptance_threshold(), 0.9);
        assert!(!request.ignores_vote_weight());
    }

    #[test]
    fn test_legacy_record_without_role_resolves_from_title() {
        let json = r#"{"user_id": 1, "thread_id": 2, "title": "artisan app", "end_time": 1800000000}"#;
        let record: RequestRecord = serde_json::from_str(json).unwrap();
        let request = RoleRequest::from_record(record, &RolePolicy::default(), NOW).unwrap();
        assert_eq!(request.role(), "Artisan");
        assert!(request.ignores_vote_weight());
        assert!(!request.is_closed());
    }

    #[test]
    fn test_unknown_role_without_threshold_fails() {
        let json = r#"{"user_id": 1, "thread_id": 2, "title": "x", "end_time": 0, "role": "Retired"}"#;
        let record: RequestRecord = serde_json::from_str(json).unwrap();
        let err = RoleRequest::from_record(record, &RolePolicy::default(), NOW).unwrap_err();
        assert_eq!(err, DomainError::MissingThreshold("Retired".to_string()));
    }

    #[test]
    fn test_stale_participant_count_is_recomputed() {
        let mut record = sample().to_record();
        record.participant_count = Some(17);
        let request = RoleRequest::from_record(record, &RolePolicy::default(), NOW).unwrap();
        assert_eq!(request.participant_count(), 2);
    }

    #[test]
    fn test_duplicate_voters_keep_first_entry() {
        let mut record = sample().to_record();
        record.no_votes.push(BallotEntry::new(UserId::new(2), 1));
        record.yes_votes.push(BallotEntry::new(UserId::new(2), 9));

        let request = RoleRequest::from_record(record, &RolePolicy::default(), NOW).unwrap();
        assert_eq!(request.participant_count(), 2);
        assert_eq!(request.tally().yes, 3);
        assert!(!request.no_votes().contains(UserId::new(2)));
    }
}
