//! Application-level configuration.
//!
//! - [`VotingParams`] — vote duration and expiry sweep interval

pub mod voting_params;

pub use voting_params::VotingParams;
