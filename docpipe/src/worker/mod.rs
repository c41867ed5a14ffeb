//! The generative worker boundary.
//!
//! The worker is the pipeline's sole external collaborator: text in, text
//! out, fallible with a single error kind. The core has no knowledge of how
//! the worker is configured, retried, or billed; retry policy, if any,
//! belongs behind this trait, not in the executor.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Error raised when the worker cannot produce output.
///
/// Fatal to the invoking stage; never retried by the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation failed: {message}")]
pub struct GenerationFailure {
    /// Worker-supplied description of the failure.
    pub message: String,
}

impl GenerationFailure {
    /// Creates a new generation failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An opaque generative collaborator invoked once per stage.
#[async_trait]
pub trait GenerativeWorker: Send + Sync {
    /// Produces output text for a composed task description.
    ///
    /// The call may block for a long time; callers that need a bound should
    /// wrap the worker in a [`DeadlineWorker`].
    async fn execute(&self, task: &str) -> Result<String, GenerationFailure>;
}

#[async_trait]
impl<W: GenerativeWorker + ?Sized> GenerativeWorker for std::sync::Arc<W> {
    async fn execute(&self, task: &str) -> Result<String, GenerationFailure> {
        (**self).execute(task).await
    }
}

/// Wraps a worker with an explicit deadline.
///
/// The inner call is raced against a timer; elapse surfaces as an ordinary
/// [`GenerationFailure`], so the executor's failure semantics are unchanged.
#[derive(Debug)]
pub struct DeadlineWorker<W> {
    inner: W,
    deadline: Duration,
}

impl<W> DeadlineWorker<W> {
    /// Wraps a worker with the given deadline.
    #[must_use]
    pub fn new(inner: W, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl<W: GenerativeWorker> GenerativeWorker for DeadlineWorker<W> {
    async fn execute(&self, task: &str) -> Result<String, GenerationFailure> {
        match tokio::time::timeout(self.deadline, self.inner.execute(task)).await {
            Ok(result) => result,
            Err(_) => {
                error!(deadline_ms = self.deadline.as_millis() as u64, "worker call exceeded deadline");
                Err(GenerationFailure::new(format!(
                    "worker call exceeded deadline of {}ms",
                    self.deadline.as_millis()
                )))
            }
        }
    }
}
