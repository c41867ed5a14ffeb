//! Event log entry type for the project audit trail.

use serde::{Deserialize, Serialize};

/// One milestone in a project's append-only audit log.
///
/// Stage completion entries carry the output path in `detail` so external
/// monitoring can correlate the event with the document it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// Event name (e.g., "BACKEND_COMPLETE").
    pub event: String,

    /// Free-form detail, conventionally the output path for completion
    /// events. Empty when the event carries no reference.
    #[serde(default)]
    pub detail: String,
}

impl EventLogEntry {
    /// Creates a new entry stamped with the current time.
    #[must_use]
    pub fn now(event: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            timestamp: crate::utils::iso_timestamp(),
            event: event.into(),
            detail: detail.into(),
        }
    }
}
