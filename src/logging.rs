//! Logging setup and small structured-logging helpers.
//!
//! Logs go to stderr so stdout carries only the report, plots and `sample` CSV.

use std::time::Instant;

use tracing::{debug, info};

/// Initialize the tracing subscriber; `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A subscriber may already be installed (e.g. when embedded in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Run `f` and log how long it took.
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    debug!(operation, "starting operation");

    let result = f();

    info!(
        operation,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "operation completed"
    );
    result
}
