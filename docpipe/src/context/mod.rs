//! Project context: the root aggregate for a pipeline's build state.
//!
//! A [`ProjectContext`] accumulates everything the pipeline knows about one
//! project: its identity, an advisory status label, the append-only artifact
//! registry and the audit event log. Registry resolution lives in
//! [`registry`] as inherent operations on the context.

mod project;
mod registry;

pub use project::ProjectContext;
pub use registry::MissingArtifact;
