//! Stage declarations and the stage execution protocol.
//!
//! A [`StageSpec`] declares what a stage consumes (required and optional
//! upstream types, each with its own excerpt budget) and what it produces
//! (one typed artifact at a deterministic path). The [`StageExecutor`] runs
//! the protocol every stage follows: resolve, excerpt, compose, generate,
//! persist, register, log, save.

mod compose;
mod executor;
mod spec;

#[cfg(test)]
mod executor_tests;

pub use compose::compose_task;
pub use executor::{StageExecutor, StageRunReport};
pub use spec::{DependencySpec, StageSpec};
