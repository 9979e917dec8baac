//! Persisted registry state and migration of older layouts.
//!
//! Current layout:
//!
//! ```json
//! { "requests": { "<id>": { ... } }, "closed_requests": { "<id>": [ { ... } ] } }
//! ```
//!
//! The first layout stored only the active map at the top level. It is
//! detected by the absence of both keys and loaded as `requests`.

use super::entities::RequestRegistry;
use crate::core::error::DomainError;
use crate::core::ids::RequestId;
use crate::request::RequestRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Full serializable registry state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub requests: BTreeMap<RequestId, RequestRecord>,
    #[serde(default)]
    pub closed_requests: BTreeMap<RequestId, Vec<RequestRecord>>,
}

/// Layout of a stored state document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotShape {
    /// Blank input or `null`
    Empty,
    /// Flat map of id -> record, no `closed_requests`
    Legacy,
    /// `{ requests, closed_requests }`
    Current,
}

impl SnapshotShape {
    /// Detect the layout of a parsed state document
    pub fn detect(value: &Value) -> Self {
        match value {
            Value::Null => SnapshotShape::Empty,
            Value::Object(map) if map.is_empty() => SnapshotShape::Empty,
            Value::Object(map)
                if map.contains_key("requests") || map.contains_key("closed_requests") =>
            {
                SnapshotShape::Current
            }
            _ => SnapshotShape::Legacy,
        }
    }
}

impl RegistrySnapshot {
    /// Parse a state document of any supported layout.
    ///
    /// Blank input yields an empty snapshot. Malformed JSON is an error; the
    /// caller decides whether to fall back to an empty registry.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(content)?;
        match SnapshotShape::detect(&value) {
            SnapshotShape::Empty => Ok(Self::default()),
            SnapshotShape::Current => serde_json::from_str(content),
            SnapshotShape::Legacy => Ok(Self {
                requests: serde_json::from_str(content)?,
                closed_requests: BTreeMap::new(),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.closed_requests.is_empty()
    }
}

/// A record that could not be restored
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub id: RequestId,
    /// Whether the record came from closed history
    pub closed: bool,
    pub error: DomainError,
}

/// Result of [`RequestRegistry::restore`]
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub registry: RequestRegistry,
    pub skipped: Vec<SkippedRecord>,
}
