//! Tracing initialization.
//!
//! Called once at startup by whoever owns the process: the `bevd` binary
//! or the embedding test runner. The evidence types never initialize
//! logging themselves, so a host that already has a subscriber keeps it.

use tracing_subscriber::EnvFilter;

/// Install a format subscriber filtered by `RUST_LOG`, falling back to
/// `default_level`. Safe to call more than once; later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
