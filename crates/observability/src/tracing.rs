//! Tracing/logging initialization.
//!
//! JSON logs with timestamps, filtered via `RUST_LOG`. Engine mutations log
//! at info, pass-through updates at debug.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default_directive("info");
}

/// Initialize with an explicit fallback directive for when `RUST_LOG` is
/// unset (tests typically pass "debug").
pub fn init_with_default_directive(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
