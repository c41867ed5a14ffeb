//! File-backed context store.

use super::{ContextStore, ProjectLock, StoreError, WriterGuard};
use crate::context::ProjectContext;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// A context store keeping one pretty-printed JSON document per project.
///
/// Documents live at `<root>/<project_id>.json`. Saves write to a `.tmp`
/// sibling and rename over the final path, so a crash mid-save leaves the
/// previous good document intact.
#[derive(Debug, Clone)]
pub struct FileContextStore {
    root: PathBuf,
}

impl FileContextStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the document path for a project identifier.
    #[must_use]
    pub fn context_path(&self, project_id: &str) -> PathBuf {
        self.root.join(format!("{project_id}.json"))
    }

    /// Acquires the exclusive writer lock for a project.
    ///
    /// The lock must be held for the whole load-mutate-save cycle; it is
    /// released when the returned guard drops.
    pub fn lock_project(&self, project_id: &str) -> Result<ProjectLock, StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Persistence {
            path: self.root.clone(),
            source,
        })?;
        ProjectLock::acquire(&self.root, project_id)
    }

    /// Returns the identifier of the most recently modified context file.
    ///
    /// This is a convenience default for interactive drivers ("continue the
    /// latest project"), not a correctness guarantee; core entry points
    /// always take an explicit identifier and never call this.
    pub fn most_recent_project_id(&self) -> Result<Option<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Persistence {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut latest: Option<(SystemTime, String)> = None;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Persistence {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
                latest = Some((modified, stem.to_string()));
            }
        }
        Ok(latest.map(|(_, id)| id))
    }
}

impl ContextStore for FileContextStore {
    fn lock(&self, project_id: &str) -> Result<WriterGuard, StoreError> {
        self.lock_project(project_id).map(WriterGuard::holding)
    }

    fn load(&self, project_id: &str) -> Result<ProjectContext, StoreError> {
        let path = self.context_path(project_id);
        let raw = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    project_id: project_id.to_string(),
                }
            } else {
                StoreError::Persistence {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let context = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        debug!(project_id, path = %path.display(), "context loaded");
        Ok(context)
    }

    fn save(&self, context: &ProjectContext) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Persistence {
            path: self.root.clone(),
            source,
        })?;

        let path = self.context_path(context.project_id());
        let body = serde_json::to_string_pretty(context).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        // Write the sibling first, rename last: a crash between the two
        // leaves the previous document visible, never a truncated one.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|source| StoreError::Persistence {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Persistence {
            path: path.clone(),
            source,
        })?;

        info!(project_id = context.project_id(), path = %path.display(), "context saved");
        Ok(())
    }
}
