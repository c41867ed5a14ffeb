//! The project context aggregate.

use crate::core::{ArtifactRecord, EventLogEntry};
use serde::{Deserialize, Serialize};

/// Accumulated build state for one project.
///
/// Created once per project, mutated by exactly one stage at a time, never
/// explicitly destroyed. `project_id` and `created_at` are write-once; the
/// artifact and event sequences only ever grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    project_id: String,
    created_at: String,
    status: String,
    #[serde(default)]
    original_request: String,
    #[serde(default)]
    pub(crate) artifacts: Vec<ArtifactRecord>,
    #[serde(default)]
    pub(crate) event_log: Vec<EventLogEntry>,
}

impl ProjectContext {
    /// Initial status for freshly created projects.
    pub const INITIAL_STATUS: &'static str = "INITIATED";

    /// Creates a new project context with a generated identifier.
    #[must_use]
    pub fn new(original_request: impl Into<String>) -> Self {
        Self::with_id(crate::utils::generate_project_id(), original_request)
    }

    /// Creates a new project context with an explicit identifier.
    #[must_use]
    pub fn with_id(project_id: impl Into<String>, original_request: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            created_at: crate::utils::iso_timestamp(),
            status: Self::INITIAL_STATUS.to_string(),
            original_request: original_request.into(),
            artifacts: Vec::new(),
            event_log: Vec::new(),
        }
    }

    /// Returns the immutable project identifier.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns the write-once creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Returns the advisory status label.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Updates the advisory status label.
    ///
    /// Last writer wins; the label is informational and never consulted by
    /// dependency resolution.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Returns the natural-language request that created the project.
    #[must_use]
    pub fn original_request(&self) -> &str {
        &self.original_request
    }

    /// Returns the full artifact registry, oldest first.
    #[must_use]
    pub fn artifacts(&self) -> &[ArtifactRecord] {
        &self.artifacts
    }

    /// Returns the audit event log, oldest first.
    #[must_use]
    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }
}
