//! State storage adapters.
//!
//! Provides [`JsonFileStateStore`], which keeps the registry snapshot in a
//! single JSON document and implements the
//! [`StateStore`](role_quorum_application::StateStore) port.

mod json_file;

pub use json_file::{DEFAULT_STATE_FILE, JsonFileStateStore};
