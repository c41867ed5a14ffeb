//! # Docpipe
//!
//! The artifact-registry and stage-execution core of a multi-stage
//! document-generation pipeline.
//!
//! A pipeline is a sequence of independent stages. Each stage resolves its
//! upstream dependencies from an append-only artifact registry, loads
//! bounded excerpts of their content, composes a task for an opaque
//! generative worker, places the worker's output at a deterministic path,
//! and registers the result for later stages. Everything a stage learns is
//! persisted in one JSON context document per project, so every stage
//! invocation is a fresh process and the pipeline resumes from disk.
//!
//! - **Registry semantics**: records are never edited or removed; resolving
//!   a type returns the most recently appended record of that type.
//! - **Degradation**: a required type missing from the registry aborts the
//!   stage; an unreadable artifact file degrades to an empty excerpt.
//! - **Durability**: context saves are atomic, stage outputs are placed by
//!   rename only after the updated context is saved, and a per-project
//!   advisory lock enforces the single-writer rule.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docpipe::prelude::*;
//!
//! let spec = StageSpec::new(
//!     "backend_developer",
//!     "Backend Developer",
//!     "BIR",
//!     "Backend Implementation Report",
//!     "dev/build",
//!     template,
//! )
//! .requires(DependencySpec::new("TIP", "Technical Implementation Plan", 3000))
//! .optionally(DependencySpec::new("SRR", "Security Review Report", 800));
//!
//! let executor = StageExecutor::new(store, worker, output_root);
//! let report = executor.run("PROJ-1A2B3C4D", &spec).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod excerpt;
pub mod observability;
pub mod stage;
pub mod store;
pub mod testing;
pub mod utils;
pub mod worker;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{MissingArtifact, ProjectContext};
    pub use crate::core::{ArtifactRecord, EventLogEntry};
    pub use crate::errors::PipelineError;
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::excerpt::load_excerpt;
    pub use crate::stage::{
        compose_task, DependencySpec, StageExecutor, StageRunReport, StageSpec,
    };
    pub use crate::store::{ContextStore, FileContextStore, ProjectLock, StoreError, WriterGuard};
    pub use crate::utils::{generate_project_id, iso_timestamp};
    pub use crate::worker::{DeadlineWorker, GenerationFailure, GenerativeWorker};
}
