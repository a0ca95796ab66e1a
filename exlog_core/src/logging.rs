//! Logging infrastructure for exlog.
//!
//! Provides centralized tracing setup for the server binary and tests.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "exlog_core=info,exlog_server=info,tower_http=info";

/// Initialize logging with the default per-crate filter
///
/// Logs go to stderr so command output on stdout stays clean. Can be
/// overridden with the RUST_LOG env var.
pub fn init() {
    init_with_filter(DEFAULT_FILTER)
}

/// Initialize logging with a specific default filter directive
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for tests (captures logs for test output)
///
/// Meant for unit and integration tests only; safe to call more than once.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
