//! Temp-directory project fixtures for executor tests.

#![allow(clippy::expect_used)]

use crate::context::ProjectContext;
use crate::core::ArtifactRecord;
use crate::store::{ContextStore, FileContextStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project environment: a context store under `logs/` and an
/// output root, both inside one temp directory that is removed on drop.
///
/// Mirrors the layout the pipeline uses in production, so executor tests
/// exercise real file paths rather than in-memory stand-ins.
pub struct ProjectFixture {
    dir: TempDir,
    store: FileContextStore,
    output_root: PathBuf,
}

impl ProjectFixture {
    /// Creates a fresh fixture.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created; fixtures are for
    /// tests only.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create fixture temp dir");
        let store = FileContextStore::new(dir.path().join("logs"));
        let output_root = dir.path().to_path_buf();
        Self {
            dir,
            store,
            output_root,
        }
    }

    /// Returns the fixture's context store.
    #[must_use]
    pub fn store(&self) -> &FileContextStore {
        &self.store
    }

    /// Returns the root directory stage outputs are written under.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Returns the fixture's base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Creates and saves a new project, returning its context.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be saved.
    pub fn create_project(&self, project_id: &str) -> ProjectContext {
        let ctx = ProjectContext::with_id(project_id, "fixture project");
        self.store.save(&ctx).expect("save fixture context");
        ctx
    }

    /// Writes upstream content to disk and registers it on the context.
    ///
    /// The file lands under the output root at `<artifact_type>.md` unless
    /// the registry already holds that type, in which case a versioned name
    /// keeps both files alive. The mutated context is saved.
    ///
    /// # Panics
    ///
    /// Panics on IO failure.
    pub fn register_upstream(
        &self,
        ctx: &mut ProjectContext,
        artifact_type: &str,
        content: &str,
    ) -> PathBuf {
        let version = ctx
            .artifacts()
            .iter()
            .filter(|r| r.artifact_type == artifact_type)
            .count();
        let path = self
            .output_root
            .join(format!("{artifact_type}_v{version}.md"));
        fs::write(&path, content).expect("write upstream artifact");

        ctx.append_artifact(ArtifactRecord::new(
            format!("{artifact_type} document"),
            artifact_type,
            &path,
            "fixture",
        ));
        self.store.save(ctx).expect("save fixture context");
        path
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
