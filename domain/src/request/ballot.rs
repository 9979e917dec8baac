//! Ballot primitives: vote direction, weighted entries and tallies.

use crate::core::ids::UserId;
use serde::{Deserialize, Serialize};

/// Which way a vote was cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Yes,
    No,
}

impl Direction {
    /// Direction encoded by the sign of a signed weight.
    ///
    /// Zero counts as a yes.
    pub fn from_signed(signed_weight: i64) -> Self {
        if signed_weight < 0 {
            Direction::No
        } else {
            Direction::Yes
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Yes => "yes",
            Direction::No => "no",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Yes => write!(f, "Yes"),
            Direction::No => write!(f, "No"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "approve" => Ok(Direction::Yes),
            "no" | "n" | "deny" => Ok(Direction::No),
            other => Err(format!("Unknown vote direction: {}. Valid: yes, no", other)),
        }
    }
}

/// One voter's live ballot entry.
///
/// Persisted as a `[voter, weight]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(UserId, u64)", into = "(UserId, u64)")]
pub struct BallotEntry {
    pub voter: UserId,
    pub weight: u64,
}

impl BallotEntry {
    pub fn new(voter: UserId, weight: u64) -> Self {
        Self { voter, weight }
    }
}

impl From<(UserId, u64)> for BallotEntry {
    fn from((voter, weight): (UserId, u64)) -> Self {
        Self { voter, weight }
    }
}

impl From<BallotEntry> for (UserId, u64) {
    fn from(entry: BallotEntry) -> Self {
        (entry.voter, entry.weight)
    }
}

/// Ordered entries for one direction, at most one per voter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ballot(Vec<BallotEntry>);

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: BallotEntry) {
        self.0.push(entry);
    }

    /// Remove a voter's entry, returning it if present
    pub(crate) fn remove_voter(&mut self, voter: UserId) -> Option<BallotEntry> {
        let index = self.0.iter().position(|e| e.voter == voter)?;
        Some(self.0.remove(index))
    }

    pub fn contains(&self, voter: UserId) -> bool {
        self.0.iter().any(|e| e.voter == voter)
    }

    pub fn get(&self, voter: UserId) -> Option<&BallotEntry> {
        self.0.iter().find(|e| e.voter == voter)
    }

    /// Sum of weights (0 when empty), saturating at `u64::MAX`
    pub fn total_weight(&self) -> u64 {
        self.0.iter().fold(0, |sum, e| sum.saturating_add(e.weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BallotEntry> {
        self.0.iter()
    }

    pub fn entries(&self) -> &[BallotEntry] {
        &self.0
    }
}

impl FromIterator<BallotEntry> for Ballot {
    fn from_iter<I: IntoIterator<Item = BallotEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Weighted yes/no sums for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u64,
    pub no: u64,
}

impl Tally {
    pub fn new(yes: u64, no: u64) -> Self {
        Self { yes, no }
    }

    pub fn total(&self) -> u64 {
        self.yes.saturating_add(self.no)
    }

    /// Fraction of weight voting yes.
    ///
    /// An empty tally divides by 1, so it reports 0.0.
    pub fn approval_ratio(&self) -> f64 {
        let denominator = match self.total() {
            0 => 1,
            n => n,
        };
        self.yes as f64 / denominator as f64
    }

    /// Whether the yes fraction reaches `threshold` (ties approve)
    pub fn meets(&self, threshold: f64) -> bool {
        self.approval_ratio() >= threshold
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Yes: {} / No: {}", self.yes, self.no)
    }
}
