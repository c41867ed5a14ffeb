//! Operator-facing tracing setup.
//!
//! The durable audit trail lives inside each project context; this module
//! only wires up stderr diagnostics for drivers that run stages as
//! standalone processes. Controlled via `RUST_LOG`, defaults to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the tracing subscriber for a stage process.
///
/// Reads `RUST_LOG`; defaults to `info` when unset. Output goes to stderr
/// in compact format so generated documents on stdout stay clean. Calling
/// this twice panics, so drivers call it once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
