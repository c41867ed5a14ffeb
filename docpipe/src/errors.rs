//! Error types for the pipeline core.
//!
//! The taxonomy mirrors the stage boundary: every variant is fatal to the
//! stage that raised it and terminates that stage's process with a non-zero
//! exit code. Unreadable artifact content is deliberately absent — it
//! degrades to an empty excerpt inside the excerpt loader instead of
//! surfacing as an error.

use crate::store::StoreError;
use crate::worker::GenerationFailure;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for stage execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A declared required upstream type has no matching registry record.
    #[error("stage '{stage}' requires artifact type '{artifact_type}' but the registry has no record of it")]
    MissingRequiredArtifact {
        /// The absent artifact type.
        artifact_type: String,
        /// The stage that declared the requirement.
        stage: String,
        /// The stage expected to have produced the type, when declared.
        produced_by: Option<String>,
    },

    /// The generative worker could not produce output.
    #[error(transparent)]
    Generation(#[from] GenerationFailure),

    /// The record store could not load or durably save the context.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The stage output could not be written to its output path.
    #[error("failed to write stage output to {path}: {source}")]
    OutputWrite {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Returns the operator-facing diagnostic for this failure.
    ///
    /// For a missing required artifact this names the stage that should have
    /// produced it, so the operator knows which stage to run first.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::MissingRequiredArtifact {
                artifact_type,
                stage,
                produced_by: Some(producer),
            } => format!(
                "stage '{stage}' requires artifact type '{artifact_type}' but the registry has no record of it; run '{producer}' first"
            ),
            other => other.to_string(),
        }
    }

    /// Returns the process exit code for this failure.
    ///
    /// Zero is never returned; each failure class gets a distinct code so
    /// external drivers can distinguish "run the producer stage first" from
    /// "the worker is down".
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingRequiredArtifact { .. } => 2,
            Self::Generation(_) => 3,
            Self::Store(_) => 4,
            Self::OutputWrite { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_diagnostic_names_producer() {
        let err = PipelineError::MissingRequiredArtifact {
            artifact_type: "BIR".to_string(),
            stage: "frontend_developer".to_string(),
            produced_by: Some("backend_developer".to_string()),
        };

        let diag = err.diagnostic();
        assert!(diag.contains("BIR"));
        assert!(diag.contains("frontend_developer"));
        assert!(diag.contains("run 'backend_developer' first"));
    }

    #[test]
    fn test_missing_required_diagnostic_without_producer() {
        let err = PipelineError::MissingRequiredArtifact {
            artifact_type: "TAD".to_string(),
            stage: "backend_developer".to_string(),
            produced_by: None,
        };

        let diag = err.diagnostic();
        assert!(diag.contains("TAD"));
        assert!(!diag.contains("first"));
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            PipelineError::MissingRequiredArtifact {
                artifact_type: "X".to_string(),
                stage: "s".to_string(),
                produced_by: None,
            },
            PipelineError::Generation(GenerationFailure::new("worker down")),
            PipelineError::Store(StoreError::NotFound {
                project_id: "PROJ-1".to_string(),
            }),
        ];

        let mut codes: Vec<i32> = errors.iter().map(PipelineError::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.dedup();
        assert_eq!(codes.len(), 3);
    }
}
