//! Logging initialisation for the Lambda binaries.

use tracing_subscriber::EnvFilter;

/// Installs a JSON `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). Subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // CloudWatch renders escape codes literally.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok();
}
