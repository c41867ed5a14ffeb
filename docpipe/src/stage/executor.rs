//! The stage execution protocol.

use super::{compose_task, StageSpec};
use crate::core::ArtifactRecord;
use crate::errors::PipelineError;
use crate::events::{EventSink, NoOpEventSink};
use crate::excerpt::load_excerpt;
use crate::store::ContextStore;
use crate::worker::GenerativeWorker;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Summary of one successful stage run.
#[derive(Debug, Clone)]
pub struct StageRunReport {
    /// The registry record appended for the new output.
    pub artifact: ArtifactRecord,

    /// Where the output content was placed.
    pub output_path: PathBuf,

    /// Size of the composed task in characters, for budget monitoring.
    pub task_chars: usize,
}

/// Runs stages against a context store and a generative worker.
///
/// Each invocation is a complete unit of work: claim the project's writer
/// lock, load the context, resolve dependencies, compose and run the
/// generation, place the output, register the artifact, log the event, and
/// save the context. No in-memory state survives between runs; resumability
/// comes entirely from what the store persisted.
pub struct StageExecutor<S, W> {
    store: S,
    worker: W,
    events: Arc<dyn EventSink>,
    output_root: PathBuf,
}

impl<S, W> StageExecutor<S, W>
where
    S: ContextStore,
    W: GenerativeWorker,
{
    /// Creates an executor writing outputs under the given root.
    #[must_use]
    pub fn new(store: S, worker: W, output_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            worker,
            events: Arc::new(NoOpEventSink),
            output_root: output_root.into(),
        }
    }

    /// Attaches an event sink for external monitoring.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Returns the output root directory.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Runs one stage to completion for an explicit project.
    ///
    /// On any error the context document on disk is untouched and no new
    /// output is visible at the stage's deterministic path. The output file
    /// is placed by rename only after the updated context has been durably
    /// saved, so a crash anywhere in between leaves no orphaned output and
    /// no lost registration.
    #[instrument(skip(self, spec), fields(stage = %spec.name))]
    pub async fn run(
        &self,
        project_id: &str,
        spec: &StageSpec,
    ) -> Result<StageRunReport, PipelineError> {
        let _guard = self.store.lock(project_id)?;
        let mut context = self.store.load(project_id)?;

        self.events.try_emit(
            "stage.started",
            Some(serde_json::json!({ "stage": spec.name, "project_id": project_id })),
        );

        // 1. Resolve dependencies: required types hard-fail, optional types
        //    pass through as explicit absence.
        let required_types: Vec<&str> = spec.required.iter().map(|d| d.artifact_type.as_str()).collect();
        let required = match context.resolve_required(&required_types) {
            Ok(resolved) => resolved,
            Err(missing) => {
                let err = missing_required(spec, &missing.artifact_type);
                self.emit_failure(spec, project_id, &err);
                return Err(err);
            }
        };
        let optional_types: Vec<&str> = spec.optional.iter().map(|d| d.artifact_type.as_str()).collect();
        let optional = context.resolve_optional(&optional_types);

        // 2. Load excerpts for every declared dependency with its budget.
        //    Readability is re-checked here; a dead path degrades to "".
        let mut sections = Vec::with_capacity(spec.required.len() + spec.optional.len());
        for dep in &spec.required {
            let record = required.get(&dep.artifact_type).copied();
            sections.push((dep.label.clone(), load_excerpt(record, dep.max_chars)));
        }
        for dep in &spec.optional {
            let record = optional.get(&dep.artifact_type).copied().flatten();
            sections.push((dep.label.clone(), load_excerpt(record, dep.max_chars)));
        }

        // 3. Compose the task and invoke the worker.
        let task = compose_task(&spec.template, &sections);
        let task_chars = task.chars().count();
        info!(task_chars, "invoking generative worker");

        let output = match self.worker.execute(&task).await {
            Ok(output) => output,
            Err(failure) => {
                let err = PipelineError::Generation(failure);
                self.emit_failure(spec, project_id, &err);
                return Err(err);
            }
        };

        // 4. Place output and register, in crash-safe order: temp write,
        //    context save, then rename into the deterministic path.
        let output_path = spec.output_path(&self.output_root, project_id);
        let tmp_path = output_path.with_extension("md.tmp");
        write_output(&output_path, &tmp_path, &output)?;

        let record = ArtifactRecord::new(
            &spec.output_name,
            &spec.output_type,
            &output_path,
            &spec.title,
        );
        context.append_artifact(record.clone());
        if let Some(status) = &spec.sets_status {
            context.set_status(status);
        }
        context.log_event(spec.completion_event(), output_path.display().to_string());

        if let Err(save_err) = self.store.save(&context) {
            // A successful generation whose bookkeeping is lost would look
            // to downstream stages as if the stage never ran. Surface it
            // loudly and withdraw the unregistered output.
            let _ = fs::remove_file(&tmp_path);
            let err = PipelineError::Store(save_err);
            self.emit_failure(spec, project_id, &err);
            return Err(err);
        }

        fs::rename(&tmp_path, &output_path).map_err(|source| PipelineError::OutputWrite {
            path: output_path.clone(),
            source,
        })?;

        info!(path = %output_path.display(), "stage completed");
        self.events.try_emit(
            "stage.completed",
            Some(serde_json::json!({
                "stage": spec.name,
                "project_id": project_id,
                "path": output_path.display().to_string(),
            })),
        );

        Ok(StageRunReport {
            artifact: record,
            output_path,
            task_chars,
        })
    }

    fn emit_failure(&self, spec: &StageSpec, project_id: &str, err: &PipelineError) {
        warn!(stage = %spec.name, "stage failed: {}", err.diagnostic());
        self.events.try_emit(
            "stage.failed",
            Some(serde_json::json!({
                "stage": spec.name,
                "project_id": project_id,
                "error": err.diagnostic(),
            })),
        );
    }
}

fn missing_required(spec: &StageSpec, artifact_type: &str) -> PipelineError {
    let produced_by = spec
        .required
        .iter()
        .find(|d| d.artifact_type == artifact_type)
        .and_then(|d| d.produced_by.clone());
    PipelineError::MissingRequiredArtifact {
        artifact_type: artifact_type.to_string(),
        stage: spec.name.clone(),
        produced_by,
    }
}

fn write_output(output_path: &Path, tmp_path: &Path, content: &str) -> Result<(), PipelineError> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| PipelineError::OutputWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(tmp_path, content).map_err(|source| PipelineError::OutputWrite {
        path: tmp_path.to_path_buf(),
        source,
    })
}
