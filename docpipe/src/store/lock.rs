//! Cross-process single-writer lock for project contexts.
//!
//! The record store is a single-writer resource per project: concurrent
//! stage invocations against the same project would silently discard each
//! other's artifact additions (last save wins). Rather than assume external
//! serialization, each load-mutate-save cycle takes an exclusive advisory
//! lock on `<root>/<project_id>.json.lock`. The lock file carries JSON
//! metadata so a contending operator can see who holds it.

use super::StoreError;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Metadata written into the lock file for contention diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process id of the lock holder.
    pub pid: u32,
    /// When the lock was acquired (ISO 8601).
    pub acquired_at: String,
}

impl LockInfo {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: crate::utils::iso_timestamp(),
        }
    }
}

/// An exclusive per-project writer lock, released on drop.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
    project_id: String,
}

impl ProjectLock {
    /// Acquires the writer lock for a project, failing fast on contention.
    ///
    /// Returns [`StoreError::Locked`] (with the holder's metadata when the
    /// lock file is readable) if another process already holds the lock.
    pub fn acquire(root: &Path, project_id: &str) -> Result<Self, StoreError> {
        let path = root.join(format!("{project_id}.json.lock"));
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| StoreError::Persistence {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            let holder = read_holder(&mut file);
            warn!(project_id, path = %path.display(), "writer lock contended");
            return Err(StoreError::Locked {
                project_id: project_id.to_string(),
                holder,
            });
        }

        let info = LockInfo::current();
        write_holder(&mut file, &path, &info)?;
        debug!(project_id, pid = info.pid, "writer lock acquired");

        Ok(Self {
            file,
            path,
            project_id: project_id.to_string(),
        })
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            warn!(project_id = %self.project_id, "failed to release writer lock: {err}");
        }
        // Best effort: the lock is advisory, a stale file is harmless.
        let _ = std::fs::remove_file(&self.path);
        debug!(project_id = %self.project_id, "writer lock released");
    }
}

fn read_holder(file: &mut File) -> Option<LockInfo> {
    let mut raw = String::new();
    file.read_to_string(&mut raw).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_holder(file: &mut File, path: &Path, info: &LockInfo) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(info).unwrap_or_default();
    let result = file
        .set_len(0)
        .and_then(|()| file.rewind())
        .and_then(|()| file.write_all(body.as_bytes()))
        .and_then(|()| file.flush());
    result.map_err(|source| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let lock = ProjectLock::acquire(dir.path(), "PROJ-LOCK0001").unwrap();
        assert!(lock.path().exists());
        drop(lock);
        assert!(!dir.path().join("PROJ-LOCK0001.json.lock").exists());
    }

    #[test]
    fn test_contention_fails_fast() {
        let dir = TempDir::new().unwrap();
        let _held = ProjectLock::acquire(dir.path(), "PROJ-LOCK0002").unwrap();

        let err = ProjectLock::acquire(dir.path(), "PROJ-LOCK0002").unwrap_err();
        match err {
            StoreError::Locked { project_id, holder } => {
                assert_eq!(project_id, "PROJ-LOCK0002");
                let holder = holder.expect("holder metadata should be readable");
                assert_eq!(holder.pid, std::process::id());
            }
            other => panic!("expected Locked, got {other:?}"),
        }
    }

    #[test]
    fn test_reacquire_after_release() {
        let dir = TempDir::new().unwrap();
        drop(ProjectLock::acquire(dir.path(), "PROJ-LOCK0003").unwrap());
        assert!(ProjectLock::acquire(dir.path(), "PROJ-LOCK0003").is_ok());
    }

    #[test]
    fn test_locks_are_per_project() {
        let dir = TempDir::new().unwrap();
        let _a = ProjectLock::acquire(dir.path(), "PROJ-LOCK0004").unwrap();
        assert!(ProjectLock::acquire(dir.path(), "PROJ-LOCK0005").is_ok());
    }
}
