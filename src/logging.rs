//! Diagnostic logging setup.
//!
//! Library code only emits `tracing` events; binaries and tests decide
//! whether a subscriber is installed.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` and then to `info`.
///
/// A subscriber that is already installed is kept.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        debug!("tracing subscriber already installed");
    }
}
