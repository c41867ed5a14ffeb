//! Artifact record type for registering stage outputs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A registry entry referencing one persisted output document.
///
/// The record stores a *reference* to the content, never the content itself;
/// ownership of the bytes at `path` belongs to the filesystem. A record's
/// existence does not guarantee its path is still readable — consumers
/// re-check readability every time they load an excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Human-readable label (e.g., "Backend Implementation Report").
    pub name: String,

    /// Short classification tag (e.g., "BIR"). Not unique across the
    /// registry; a re-run or patch stage legitimately appends a second
    /// record of the same type.
    #[serde(rename = "type")]
    pub artifact_type: String,

    /// Location of the persisted output content.
    pub path: PathBuf,

    /// Creation timestamp (ISO 8601), set once, never mutated.
    pub created_at: String,

    /// Label of the stage that produced the artifact.
    pub created_by: String,
}

impl ArtifactRecord {
    /// Creates a new artifact record stamped with the current time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        path: impl Into<PathBuf>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            path: path.into(),
            created_at: crate::utils::iso_timestamp(),
            created_by: created_by.into(),
        }
    }

    /// Returns the referenced path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = ArtifactRecord::new(
            "Backend Implementation Report",
            "BIR",
            "dev/build/PROJ-1A2B3C4D_BIR.md",
            "Backend Developer",
        );

        assert_eq!(record.artifact_type, "BIR");
        assert_eq!(record.created_by, "Backend Developer");
        assert!(record.created_at.contains('T'));
    }

    #[test]
    fn test_record_serialization_uses_type_key() {
        let record = ArtifactRecord::new("Frontend Report", "FIR", "dev/build/x.md", "Frontend Developer");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "FIR");
        assert!(json.get("artifact_type").is_none());

        let back: ArtifactRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
