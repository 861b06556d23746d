//! # Observability
//!
//! Structured logging through `tracing` and passive request counters.
//!
//! Observability is read-only: nothing here influences request handling.

mod metrics;

pub use metrics::{RequestMetrics, RequestMetricsSnapshot};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (e.g. `"info"`,
/// `"examcal=debug"`) is used. Calling this twice is harmless.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing("debug");
        init_tracing("info");
    }
}
