//! Request registry domain
//!
//! [`RequestRegistry`] is the owned collection of active and closed role
//! requests. It is created empty or restored from a [`RegistrySnapshot`];
//! there is no process-wide instance.

pub mod entities;
pub mod snapshot;

pub use entities::RequestRegistry;
pub use snapshot::{RegistrySnapshot, RestoreReport, SkippedRecord, SnapshotShape};
