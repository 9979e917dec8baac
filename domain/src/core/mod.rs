//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`] — identifiers for users, requests and prompt messages
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod ids;
