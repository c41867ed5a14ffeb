//! Core record types shared across the pipeline.
//!
//! These are plain value types: an [`ArtifactRecord`] references a persisted
//! output document, an [`EventLogEntry`] records a pipeline milestone. Both
//! live inside a project context and are append-only once added.

mod artifact;
mod event;

pub use artifact::ArtifactRecord;
pub use event::EventLogEntry;
