//! Role request domain
//!
//! A role request is a timed, weighted yes/no vote on granting one role to
//! one user.
//!
//! # Outcome
//!
//! ```text
//! veto set?  ── yes ──▶ forced outcome
//!     │
//!     no
//!     ▼
//! yes / max(yes + no, 1) >= threshold  ──▶ Approved / Denied
//! ```
//!
//! Each voter holds at most one ballot entry. Voting again replaces the
//! earlier entry in whichever ballot held it.

pub mod ballot;
pub mod entities;
pub mod outcome;
pub mod record;
pub mod veto;

pub use ballot::{Ballot, BallotEntry, Direction, Tally};
pub use entities::{NewRequest, RoleRequest};
pub use outcome::RequestOutcome;
pub use record::RequestRecord;
pub use veto::{FeedbackEntry, Veto};
