//! Observability subsystem for folio
//!
//! This module provides:
//! - Typed lifecycle events (the `event` field of every log line)
//! - Subscriber setup for structured logging via `tracing`
//! - Monotonic counters exposed over HTTP
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. Logging failures never fail an operation

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `level` when set. Returns false if a subscriber was
/// already installed (tests, embedding applications).
pub fn init_logging(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
