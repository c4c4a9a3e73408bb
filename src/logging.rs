//! Logging setup
//!
//! `tracing` events from the library, formatted by `tracing-subscriber`.
//! `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=crop_drought_rust=debug` to see dropped trailing dry runs.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter: info for this crate, warn for dependencies
pub const DEFAULT_FILTER: &str = "crop_drought_rust=info,warn";

/// Install the global subscriber. Call once from a binary.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Debug-level subscriber routed through the test harness; safe to call from
/// several tests.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
