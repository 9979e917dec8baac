//! Domain layer for role-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns, and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Role Request
//!
//! A user asks for a role. A timed vote opens, community members cast
//! weighted yes/no votes, and when the vote ends the request is either
//! approved or denied:
//!
//! - **Weight class**: how much a voter's ballot counts, from the roles they hold
//! - **Acceptance threshold**: the weighted yes fraction a role needs
//! - **Veto**: a moderator override that replaces the computed outcome
//!
//! ## Registry
//!
//! The [`RequestRegistry`] keeps open requests by id and archives closed
//! ones for later audit.

pub mod core;
pub mod policy;
pub mod registry;
pub mod request;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    ids::{MessageId, RequestId, Timestamp, UserId},
};
pub use policy::{PolicyIssue, PolicyIssueCode, RolePolicy, Severity};
pub use registry::{
    RegistrySnapshot, RequestRegistry, RestoreReport, SkippedRecord, SnapshotShape,
};
pub use request::{
    Ballot, BallotEntry, Direction, FeedbackEntry, NewRequest, RequestOutcome, RequestRecord,
    RoleRequest, Tally, Veto,
};
