//! Integration tests for the stage execution protocol.

use super::{DependencySpec, StageExecutor, StageSpec};
use crate::context::ProjectContext;
use crate::errors::PipelineError;
use crate::events::CollectingEventSink;
use crate::store::{ContextStore, FileContextStore, StoreError};
use crate::testing::{FailingWorker, MockWorker, ProjectFixture};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

const PROJECT: &str = "PROJ-TEST1234";

fn backend_spec() -> StageSpec {
    StageSpec::new(
        "backend_developer",
        "Backend Developer",
        "BIR",
        "Backend Implementation Report",
        "dev/build",
        "Produce a complete Backend Implementation Report.",
    )
    .requires(
        DependencySpec::new("TIP", "Technical Implementation Plan", 3000)
            .produced_by("senior_developer"),
    )
    .requires(
        DependencySpec::new("TAD", "Technical Architecture Document", 2000)
            .produced_by("technical_architect"),
    )
    .with_completion_status("BACKEND_COMPLETE")
}

fn qa_spec() -> StageSpec {
    StageSpec::new(
        "qa_lead",
        "QA Lead",
        "MTP",
        "Master Test Plan",
        "dev/quality",
        "Produce a Master Test Plan.",
    )
    .requires(DependencySpec::new("BIR", "Backend Implementation Report", 2500).produced_by("backend_developer"))
    .optionally(DependencySpec::new("FIR", "Frontend Implementation Report", 1500))
    .with_completion_status("QA_COMPLETE")
}

fn executor(
    fixture: &ProjectFixture,
    worker: Arc<MockWorker>,
) -> StageExecutor<FileContextStore, Arc<MockWorker>> {
    StageExecutor::new(fixture.store().clone(), worker, fixture.output_root())
}

#[tokio::test]
async fn test_happy_path_registers_logs_and_persists() {
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan: build the API");
    fixture.register_upstream(&mut ctx, "TAD", "architecture: three tiers");

    let worker = Arc::new(MockWorker::returning("# BIR\nendpoints..."));
    let report = executor(&fixture, worker.clone())
        .run(PROJECT, &backend_spec())
        .await
        .unwrap();

    // Output placed at the deterministic path.
    let expected: PathBuf = fixture
        .output_root()
        .join("dev/build")
        .join(format!("{PROJECT}_BIR.md"));
    assert_eq!(report.output_path, expected);
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), "# BIR\nendpoints...");

    // Task carried the template and both excerpts.
    let task = worker.last_task().unwrap();
    assert!(task.starts_with("Produce a complete Backend Implementation Report."));
    assert!(task.contains("plan: build the API"));
    assert!(task.contains("architecture: three tiers"));

    // Registration, status and audit trail are durable.
    let saved = fixture.store().load(PROJECT).unwrap();
    assert_eq!(saved.status(), "BACKEND_COMPLETE");
    let bir = saved.resolve_latest("BIR").unwrap();
    assert_eq!(bir.path(), expected.as_path());
    assert_eq!(bir.created_by, "Backend Developer");
    let last_event = saved.event_log().last().unwrap();
    assert_eq!(last_event.event, "BACKEND_COMPLETE");
    assert_eq!(last_event.detail, expected.display().to_string());
}

#[tokio::test]
async fn test_excerpt_budget_bounds_task_content() {
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", &"A".repeat(4000));
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let worker = Arc::new(MockWorker::returning("out"));
    executor(&fixture, worker.clone())
        .run(PROJECT, &backend_spec())
        .await
        .unwrap();

    // TIP budget is 3000 chars; the 4000-char document is cut, not carried.
    let task = worker.last_task().unwrap();
    assert_eq!(task.chars().filter(|c| *c == 'A').count(), 3000);
}

#[tokio::test]
async fn test_missing_required_aborts_without_side_effects() {
    // No BIR in the registry, and the stage requires one.
    let fixture = ProjectFixture::new();
    fixture.create_project(PROJECT);

    let worker = Arc::new(MockWorker::returning("never used"));
    let err = executor(&fixture, worker.clone())
        .run(PROJECT, &qa_spec())
        .await
        .unwrap_err();

    match &err {
        PipelineError::MissingRequiredArtifact {
            artifact_type,
            stage,
            produced_by,
        } => {
            assert_eq!(artifact_type, "BIR");
            assert_eq!(stage, "qa_lead");
            assert_eq!(produced_by.as_deref(), Some("backend_developer"));
        }
        other => panic!("expected MissingRequiredArtifact, got {other:?}"),
    }
    assert_ne!(err.exit_code(), 0);

    // Worker never invoked, no record appended, no output written.
    assert_eq!(worker.call_count(), 0);
    assert!(fixture.store().load(PROJECT).unwrap().artifacts().is_empty());
    assert!(!fixture.output_root().join("dev/quality").exists());
}

#[tokio::test]
async fn test_optional_absent_degrades_to_empty_excerpt() {
    // FIR declared optional and absent; the stage still runs.
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "BIR", "backend report body");

    let worker = Arc::new(MockWorker::returning("test plan"));
    executor(&fixture, worker.clone())
        .run(PROJECT, &qa_spec())
        .await
        .unwrap();

    assert_eq!(worker.call_count(), 1);
    let task = worker.last_task().unwrap();
    assert!(task.contains("backend report body"));
    // The FIR section is present with an empty body.
    assert!(task.ends_with("--- Frontend Implementation Report (excerpt) ---\n"));
}

#[tokio::test]
async fn test_optional_unreadable_degrades_to_empty_excerpt() {
    // FIR registered but its file was deleted out from under the record.
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "BIR", "backend report body");
    let fir_path = fixture.register_upstream(&mut ctx, "FIR", "frontend report body");
    std::fs::remove_file(&fir_path).unwrap();

    let worker = Arc::new(MockWorker::returning("test plan"));
    executor(&fixture, worker.clone())
        .run(PROJECT, &qa_spec())
        .await
        .unwrap();

    let task = worker.last_task().unwrap();
    assert!(!task.contains("frontend report body"));
    assert!(task.ends_with("--- Frontend Implementation Report (excerpt) ---\n"));

    // The stage completed and registered its output.
    let saved = fixture.store().load(PROJECT).unwrap();
    assert!(saved.resolve_latest("MTP").is_some());
}

#[tokio::test]
async fn test_generation_failure_aborts_without_side_effects() {
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");
    let before = fixture.store().load(PROJECT).unwrap();

    let exec = StageExecutor::new(
        fixture.store().clone(),
        FailingWorker::new("model unavailable"),
        fixture.output_root(),
    );
    let err = exec.run(PROJECT, &backend_spec()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Generation(_)));
    assert!(err.diagnostic().contains("model unavailable"));

    // Context on disk is byte-for-byte what it was; no output, no temp file.
    let after = fixture.store().load(PROJECT).unwrap();
    assert_eq!(after.artifacts().len(), before.artifacts().len());
    assert_eq!(after.event_log().len(), before.event_log().len());
    assert!(!fixture.output_root().join("dev/build").exists());
}

#[tokio::test]
async fn test_rerun_overwrites_file_and_retains_records() {
    // Two runs: two records of the same type, one file, second content.
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let worker = Arc::new(MockWorker::returning("first run"));
    let exec = executor(&fixture, worker.clone());
    exec.run(PROJECT, &backend_spec()).await.unwrap();

    worker.set_output("second run");
    let report = exec.run(PROJECT, &backend_spec()).await.unwrap();

    let saved = fixture.store().load(PROJECT).unwrap();
    let bir_records: Vec<_> = saved
        .artifacts()
        .iter()
        .filter(|r| r.artifact_type == "BIR")
        .collect();
    assert_eq!(bir_records.len(), 2);
    assert_eq!(bir_records[0].path(), bir_records[1].path());

    let dir_entries: Vec<_> = std::fs::read_dir(fixture.output_root().join("dev/build"))
        .unwrap()
        .collect();
    assert_eq!(dir_entries.len(), 1);
    assert_eq!(std::fs::read_to_string(&report.output_path).unwrap(), "second run");
}

#[tokio::test]
async fn test_registry_grows_monotonically_across_runs() {
    // The registry never shrinks, whatever sequence of runs happens.
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let worker = Arc::new(MockWorker::returning("out"));
    let exec = executor(&fixture, worker);

    let mut last_len = fixture.store().load(PROJECT).unwrap().artifacts().len();
    for _ in 0..3 {
        exec.run(PROJECT, &backend_spec()).await.unwrap();
        let len = fixture.store().load(PROJECT).unwrap().artifacts().len();
        assert!(len > last_len);
        last_len = len;
    }
}

#[tokio::test]
async fn test_stage_consumes_latest_record_of_a_type() {
    // A re-registered TIP shadows the earlier one when composing the task.
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan version one");
    fixture.register_upstream(&mut ctx, "TIP", "plan version two");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let worker = Arc::new(MockWorker::returning("out"));
    executor(&fixture, worker.clone())
        .run(PROJECT, &backend_spec())
        .await
        .unwrap();

    let task = worker.last_task().unwrap();
    assert!(task.contains("plan version two"));
    assert!(!task.contains("plan version one"));
}

#[tokio::test]
async fn test_save_failure_withdraws_output() {
    struct FailingSaveStore {
        inner: FileContextStore,
    }

    impl ContextStore for FailingSaveStore {
        fn load(&self, project_id: &str) -> Result<ProjectContext, StoreError> {
            self.inner.load(project_id)
        }

        fn save(&self, context: &ProjectContext) -> Result<(), StoreError> {
            Err(StoreError::Persistence {
                path: self.inner.context_path(context.project_id()),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let exec = StageExecutor::new(
        FailingSaveStore {
            inner: fixture.store().clone(),
        },
        MockWorker::returning("generated but unbookkept"),
        fixture.output_root(),
    );
    let err = exec.run(PROJECT, &backend_spec()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::Persistence { .. })));

    // Neither the final output nor the temp sibling survives.
    let build_dir = fixture.output_root().join("dev/build");
    let leftovers: Vec<_> = std::fs::read_dir(&build_dir)
        .map(|d| d.collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());

    // On disk the stage never ran.
    assert!(fixture.store().load(PROJECT).unwrap().resolve_latest("BIR").is_none());
}

#[tokio::test]
async fn test_concurrent_writer_is_rejected() {
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let _held = fixture.store().lock_project(PROJECT).unwrap();

    let worker = Arc::new(MockWorker::returning("out"));
    let err = executor(&fixture, worker.clone())
        .run(PROJECT, &backend_spec())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Store(StoreError::Locked { .. })));
    assert_eq!(worker.call_count(), 0);
}

#[tokio::test]
async fn test_lifecycle_events_reach_the_sink() {
    let fixture = ProjectFixture::new();
    let mut ctx = fixture.create_project(PROJECT);
    fixture.register_upstream(&mut ctx, "TIP", "plan");
    fixture.register_upstream(&mut ctx, "TAD", "arch");

    let sink = Arc::new(CollectingEventSink::new());
    let exec = StageExecutor::new(
        fixture.store().clone(),
        MockWorker::returning("out"),
        fixture.output_root(),
    )
    .with_event_sink(sink.clone());
    exec.run(PROJECT, &backend_spec()).await.unwrap();

    let types: Vec<String> = sink.events().into_iter().map(|(t, _)| t).collect();
    assert_eq!(types, vec!["stage.started", "stage.completed"]);

    let (_, data) = sink.events_of_type("stage.completed").pop().unwrap();
    let data = data.unwrap();
    assert_eq!(data["stage"], "backend_developer");
    assert!(data["path"].as_str().unwrap().ends_with("_BIR.md"));
}

#[tokio::test]
async fn test_failure_event_reaches_the_sink() {
    let fixture = ProjectFixture::new();
    fixture.create_project(PROJECT);

    let sink = Arc::new(CollectingEventSink::new());
    let exec = StageExecutor::new(
        fixture.store().clone(),
        MockWorker::returning("out"),
        fixture.output_root(),
    )
    .with_event_sink(sink.clone());
    exec.run(PROJECT, &qa_spec()).await.unwrap_err();

    let failed = sink.events_of_type("stage.failed");
    assert_eq!(failed.len(), 1);
    let data = failed[0].1.clone().unwrap();
    assert!(data["error"].as_str().unwrap().contains("BIR"));
}
