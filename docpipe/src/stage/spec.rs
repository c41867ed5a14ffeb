//! Stage and dependency declarations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One declared upstream dependency of a stage.
///
/// The excerpt budget is declared here, per (stage, upstream-type) pair:
/// a primary dependency gets several thousand characters, peripheral
/// context a few hundred. The same upstream type can carry different
/// budgets in different stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// The upstream artifact type to resolve (e.g., "TIP").
    pub artifact_type: String,

    /// Section heading used when composing the task.
    pub label: String,

    /// Maximum characters of upstream content this stage may consume.
    pub max_chars: usize,

    /// The stage expected to have produced the type, used in the
    /// missing-dependency diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced_by: Option<String>,
}

impl DependencySpec {
    /// Creates a new dependency declaration.
    #[must_use]
    pub fn new(
        artifact_type: impl Into<String>,
        label: impl Into<String>,
        max_chars: usize,
    ) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            label: label.into(),
            max_chars,
            produced_by: None,
        }
    }

    /// Names the stage expected to produce this type.
    #[must_use]
    pub fn produced_by(mut self, stage: impl Into<String>) -> Self {
        self.produced_by = Some(stage.into());
        self
    }
}

/// Declaration of one pipeline stage.
///
/// The spec is pure data; prompt template content is supplied by the
/// surrounding scripts and treated as opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Machine name of the stage (e.g., "backend_developer").
    pub name: String,

    /// Human label recorded as the artifact's `created_by`
    /// (e.g., "Backend Developer").
    pub title: String,

    /// Fixed instructional template prepended to the composed task.
    pub template: String,

    /// Upstream types whose absence aborts the stage.
    #[serde(default)]
    pub required: Vec<DependencySpec>,

    /// Upstream types whose absence degrades to an empty excerpt.
    #[serde(default)]
    pub optional: Vec<DependencySpec>,

    /// Type tag of the produced artifact (e.g., "BIR"). Doubles as the
    /// output code embedded in the deterministic output path.
    pub output_type: String,

    /// Human-readable name of the produced artifact.
    pub output_name: String,

    /// Document-category directory the output lands in (e.g., "dev/build").
    pub category_dir: String,

    /// Advisory status label applied to the context on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_status: Option<String>,
}

impl StageSpec {
    /// Creates a new stage spec with no dependencies.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        output_type: impl Into<String>,
        output_name: impl Into<String>,
        category_dir: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            template: template.into(),
            required: Vec::new(),
            optional: Vec::new(),
            output_type: output_type.into(),
            output_name: output_name.into(),
            category_dir: category_dir.into(),
            sets_status: None,
        }
    }

    /// Adds a required dependency.
    #[must_use]
    pub fn requires(mut self, dep: DependencySpec) -> Self {
        self.required.push(dep);
        self
    }

    /// Adds an optional dependency.
    #[must_use]
    pub fn optionally(mut self, dep: DependencySpec) -> Self {
        self.optional.push(dep);
        self
    }

    /// Sets the advisory status label applied on completion.
    #[must_use]
    pub fn with_completion_status(mut self, status: impl Into<String>) -> Self {
        self.sets_status = Some(status.into());
        self
    }

    /// Returns the deterministic output path for a project.
    ///
    /// Re-running the stage writes the same path again: idempotent naming
    /// trades version history for simplicity.
    #[must_use]
    pub fn output_path(&self, output_root: &Path, project_id: &str) -> PathBuf {
        output_root
            .join(&self.category_dir)
            .join(format!("{project_id}_{}.md", self.output_type))
    }

    /// Returns the event name logged on completion.
    ///
    /// Matches the completion status when one is declared, so the audit log
    /// and the status label stay in step.
    #[must_use]
    pub fn completion_event(&self) -> String {
        self.sets_status
            .clone()
            .unwrap_or_else(|| format!("{}_COMPLETE", self.output_type))
    }

    /// Returns all declared dependencies in composition order:
    /// required first, then optional, each in declaration order.
    #[must_use]
    pub fn declared_dependencies(&self) -> Vec<&DependencySpec> {
        self.required.iter().chain(self.optional.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backend_spec() -> StageSpec {
        StageSpec::new(
            "backend_developer",
            "Backend Developer",
            "BIR",
            "Backend Implementation Report",
            "dev/build",
            "Produce a complete Backend Implementation Report.",
        )
        .requires(DependencySpec::new("TIP", "Technical Implementation Plan", 3000).produced_by("senior_developer"))
        .requires(DependencySpec::new("TAD", "Technical Architecture Document", 2000).produced_by("technical_architect"))
        .optionally(DependencySpec::new("SRR", "Security Review Report", 800))
        .with_completion_status("BACKEND_COMPLETE")
    }

    #[test]
    fn test_output_path_is_deterministic() {
        let spec = backend_spec();
        let path = spec.output_path(Path::new("/work"), "PROJ-1A2B3C4D");
        assert_eq!(path, Path::new("/work/dev/build/PROJ-1A2B3C4D_BIR.md"));
        // Same inputs, same path.
        assert_eq!(path, spec.output_path(Path::new("/work"), "PROJ-1A2B3C4D"));
    }

    #[test]
    fn test_completion_event_prefers_status() {
        assert_eq!(backend_spec().completion_event(), "BACKEND_COMPLETE");

        let bare = StageSpec::new("qa", "QA Lead", "MTP", "Master Test Plan", "dev/quality", "t");
        assert_eq!(bare.completion_event(), "MTP_COMPLETE");
    }

    #[test]
    fn test_declared_dependencies_order() {
        let spec = backend_spec();
        let types: Vec<&str> = spec
            .declared_dependencies()
            .iter()
            .map(|d| d.artifact_type.as_str())
            .collect();
        assert_eq!(types, vec!["TIP", "TAD", "SRR"]);
    }

    #[test]
    fn test_spec_round_trips() {
        let spec = backend_spec();
        let json = serde_json::to_string(&spec).unwrap();
        let back: StageSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
