//! Event sinks for pipeline observability.
//!
//! Sinks receive stage lifecycle notifications (`stage.started`,
//! `stage.completed`, `stage.failed`) alongside the durable event log kept
//! inside the project context. The context log is the audit record; sinks
//! are for external monitoring and may drop events freely.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
