//! Role policy domain
//!
//! The static, process-wide rules a role request is judged by: which roles
//! can be requested, how much approval each needs, and how much each voter's
//! ballot weighs.
//!
//! A [`RolePolicy`] is read when a request is created. The threshold and the
//! weight mode are copied onto the request at that moment, so reloading the
//! policy never changes the rules of a vote that is already running.

pub mod role_policy;
pub mod validation;

pub use role_policy::{DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_VOTE_WEIGHT, RolePolicy};
pub use validation::{PolicyIssue, PolicyIssueCode, Severity};
