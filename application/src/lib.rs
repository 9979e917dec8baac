//! Application layer for role-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::VotingParams;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    state_store::{InMemoryStateStore, StateStore, StoreError},
};
pub use use_cases::request_service::{
    CastVote, EarlyOutcome, RequestService, ServiceError, SweepReport, Verdict,
};
