//! Mock generative workers for testing.

use crate::worker::{GenerationFailure, GenerativeWorker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// A mock worker that records calls and returns a configurable output.
#[derive(Debug)]
pub struct MockWorker {
    output: Mutex<String>,
    call_count: Mutex<usize>,
    tasks: Mutex<Vec<String>>,
}

impl MockWorker {
    /// Creates a mock worker returning the given output.
    #[must_use]
    pub fn returning(output: impl Into<String>) -> Self {
        Self {
            output: Mutex::new(output.into()),
            call_count: Mutex::new(0),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Sets the output to return on subsequent calls.
    pub fn set_output(&self, output: impl Into<String>) {
        *self.output.lock() = output.into();
    }

    /// Returns the number of times the worker was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the task descriptions from each call.
    #[must_use]
    pub fn recorded_tasks(&self) -> Vec<String> {
        self.tasks.lock().clone()
    }

    /// Returns the most recent task description, if any.
    #[must_use]
    pub fn last_task(&self) -> Option<String> {
        self.tasks.lock().last().cloned()
    }
}

#[async_trait]
impl GenerativeWorker for MockWorker {
    async fn execute(&self, task: &str) -> Result<String, GenerationFailure> {
        *self.call_count.lock() += 1;
        self.tasks.lock().push(task.to_string());
        Ok(self.output.lock().clone())
    }
}

/// A worker that always fails.
#[derive(Debug)]
pub struct FailingWorker {
    message: String,
    call_count: Mutex<usize>,
}

impl FailingWorker {
    /// Creates a worker failing with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            call_count: Mutex::new(0),
        }
    }

    /// Returns the number of times the worker was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl GenerativeWorker for FailingWorker {
    async fn execute(&self, _task: &str) -> Result<String, GenerationFailure> {
        *self.call_count.lock() += 1;
        Err(GenerationFailure::new(self.message.clone()))
    }
}

/// A worker that takes time before answering, for deadline tests.
#[derive(Debug)]
pub struct SlowWorker {
    delay: Duration,
}

impl SlowWorker {
    /// Creates a worker that sleeps for `delay` before answering.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl GenerativeWorker for SlowWorker {
    async fn execute(&self, _task: &str) -> Result<String, GenerationFailure> {
        tokio::time::sleep(self.delay).await;
        Ok("slow output".to_string())
    }
}
