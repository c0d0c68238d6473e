//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PROCFIND_LOG=debug`.
pub const LOG_ENV: &str = "PROCFIND_LOG";

/// Install a stderr subscriber. Falls back to `RUST_LOG`, then to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
