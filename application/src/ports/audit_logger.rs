//! Audit trail port.
//!
//! [`RequestService`](crate::RequestService) emits one [`AuditEvent`] per
//! successful change to a request, so moderators can later see who voted,
//! who vetoed and how each request was closed. Events for a closed request
//! are emitted even when saving the state afterwards fails.

use serde_json::Value;

/// One entry in the audit trail.
///
/// The sink stamps the time; the service only names the event and fills in
/// the request id and the fields relevant to it.
pub struct AuditEvent {
    /// `request_opened`, `vote_cast`, `vote_cancelled`, `feedback_submitted`,
    /// `veto_set`, `request_closed` or `request_removed`
    pub event_type: &'static str,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Destination for audit events.
///
/// `log` cannot fail; a sink that cannot write reports it through `tracing`
/// and carries on.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// Discards every event. Used when no audit file is configured.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
