//! Test support: mock workers and project fixtures.
//!
//! Exposed as a normal module so integration tests and downstream crates
//! can drive the executor without a real generative backend.

#[cfg(any(test, feature = "test-support"))]
mod fixtures;
mod mocks;

#[cfg(any(test, feature = "test-support"))]
pub use fixtures::ProjectFixture;
pub use mocks::{FailingWorker, MockWorker, SlowWorker};
