//! Durable persistence for project contexts.
//!
//! One JSON document per project, read and written as a whole; no partial
//! updates. Saves are atomic (write-temp-then-rename) so a crash mid-save
//! never exposes a truncated document to the next reader. A per-project
//! advisory lock enforces the single-writer rule across processes.

mod file_store;
mod lock;

pub use file_store::FileContextStore;
pub use lock::{LockInfo, ProjectLock};

use crate::context::ProjectContext;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No context document exists for the identifier.
    #[error("no context found for project '{project_id}'")]
    NotFound {
        /// The unknown project identifier.
        project_id: String,
    },

    /// The context document could not be read or durably written.
    #[error("persistence failure at {path}: {source}")]
    Persistence {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The context document is not valid JSON.
    #[error("corrupt context document at {path}: {source}")]
    Corrupt {
        /// The path of the unparseable document.
        path: PathBuf,
        /// The underlying decode error.
        source: serde_json::Error,
    },

    /// Another process holds the project's writer lock.
    #[error("project '{project_id}' is locked by another writer{}", .holder.as_ref().map(|h| format!(" (pid {})", h.pid)).unwrap_or_default())]
    Locked {
        /// The contended project identifier.
        project_id: String,
        /// Metadata left by the current holder, when readable.
        holder: Option<LockInfo>,
    },
}

/// Guard representing the single-writer claim on a project.
///
/// Dropping the guard releases the claim. Stores without cross-process
/// state (in-memory test doubles) return a no-op guard.
#[derive(Debug, Default)]
pub struct WriterGuard {
    _lock: Option<ProjectLock>,
}

impl WriterGuard {
    /// A guard that claims nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self { _lock: None }
    }

    /// A guard holding an advisory file lock.
    #[must_use]
    pub fn holding(lock: ProjectLock) -> Self {
        Self { _lock: Some(lock) }
    }
}

/// Contract for loading and saving project contexts.
///
/// Implementations must make `save` atomic with respect to partial writes:
/// a reader never observes a half-written document.
pub trait ContextStore: Send + Sync {
    /// Claims the single-writer lock for a project.
    ///
    /// Held for the whole load-mutate-save cycle; a contending writer fails
    /// fast with [`StoreError::Locked`] instead of silently losing updates.
    fn lock(&self, project_id: &str) -> Result<WriterGuard, StoreError> {
        let _ = project_id;
        Ok(WriterGuard::noop())
    }

    /// Loads the context for a project identifier.
    fn load(&self, project_id: &str) -> Result<ProjectContext, StoreError>;

    /// Durably saves the full context document.
    fn save(&self, context: &ProjectContext) -> Result<(), StoreError>;
}
