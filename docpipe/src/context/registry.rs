//! Artifact registry operations on the project context.
//!
//! The registry is the `artifacts` sequence inside [`ProjectContext`]:
//! append-only, unvalidated, resolved by type with a last-writer-wins
//! tie-break. Lookups are linear scans; registries hold tens of records,
//! not thousands.

use super::ProjectContext;
use crate::core::{ArtifactRecord, EventLogEntry};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error raised when a required artifact type has no registry record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no artifact of type '{artifact_type}' in the registry")]
pub struct MissingArtifact {
    /// The absent artifact type.
    pub artifact_type: String,
}

impl ProjectContext {
    /// Appends a record to the registry.
    ///
    /// No deduplication and no validation: a type may recur (stage re-run,
    /// patch stage), and the referenced path is not checked for readability.
    pub fn append_artifact(&mut self, record: ArtifactRecord) {
        self.artifacts.push(record);
    }

    /// Resolves the authoritative record for an artifact type.
    ///
    /// Returns the **last** appended record whose type matches: later
    /// records of a type shadow earlier ones for consumers, while earlier
    /// ones remain in the sequence for audit.
    #[must_use]
    pub fn resolve_latest(&self, artifact_type: &str) -> Option<&ArtifactRecord> {
        self.artifacts
            .iter()
            .rev()
            .find(|record| record.artifact_type == artifact_type)
    }

    /// Resolves every required type, or fails on the first absent one.
    ///
    /// A missing required type is a hard failure: the caller must abort
    /// without partial execution.
    pub fn resolve_required<'a>(
        &'a self,
        types: &[&str],
    ) -> Result<BTreeMap<String, &'a ArtifactRecord>, MissingArtifact> {
        let mut resolved = BTreeMap::new();
        for artifact_type in types {
            let record = self.resolve_latest(artifact_type).ok_or_else(|| MissingArtifact {
                artifact_type: (*artifact_type).to_string(),
            })?;
            resolved.insert((*artifact_type).to_string(), record);
        }
        Ok(resolved)
    }

    /// Resolves every optional type, tolerating absence.
    ///
    /// Absent types map to `None`: an explicit absence the stage degrades
    /// around, never an error.
    #[must_use]
    pub fn resolve_optional<'a>(
        &'a self,
        types: &[&str],
    ) -> BTreeMap<String, Option<&'a ArtifactRecord>> {
        types
            .iter()
            .map(|artifact_type| {
                (
                    (*artifact_type).to_string(),
                    self.resolve_latest(artifact_type),
                )
            })
            .collect()
    }

    /// Appends an audit event stamped with the current time.
    pub fn log_event(&mut self, event: impl Into<String>, detail: impl Into<String>) {
        self.event_log.push(EventLogEntry::now(event, detail));
    }
}
