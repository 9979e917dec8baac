//! Moderator overrides and voter feedback.

use crate::core::ids::UserId;
use serde::{Deserialize, Serialize};

/// A moderator override that replaces the computed outcome.
///
/// Persisted as an `[overrider, approve]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(UserId, bool)", into = "(UserId, bool)")]
pub struct Veto {
    /// Moderator who forced the outcome
    pub overrider: UserId,
    /// The forced outcome
    pub approve: bool,
}

impl From<(UserId, bool)> for Veto {
    fn from((overrider, approve): (UserId, bool)) -> Self {
        Self { overrider, approve }
    }
}

impl From<Veto> for (UserId, bool) {
    fn from(veto: Veto) -> Self {
        (veto.overrider, veto.approve)
    }
}

/// Free-text feedback left by a voter.
///
/// Persisted as an `[author, text]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(UserId, String)", into = "(UserId, String)")]
pub struct FeedbackEntry {
    pub author: UserId,
    pub text: String,
}

impl FeedbackEntry {
    pub fn new(author: UserId, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
        }
    }
}

impl From<(UserId, String)> for FeedbackEntry {
    fn from((author, text): (UserId, String)) -> Self {
        Self { author, text }
    }
}

impl From<FeedbackEntry> for (UserId, String) {
    fn from(entry: FeedbackEntry) -> Self {
        (entry.author, entry.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_veto_pair_format() {
        let veto = Veto::from((UserId::new(9), false));
        assert_eq!(serde_json::to_string(&veto).unwrap(), "[9,false]");

        let none: Option<Veto> = serde_json::from_str("null").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_feedback_pair_format() {
        let entry: FeedbackEntry = serde_json::from_str(r#"[3,"needs more builds"]"#).unwrap();
        assert_eq!(entry.author, UserId::new(3));
        assert_eq!(entry.text, "needs more builds");
    }
}
