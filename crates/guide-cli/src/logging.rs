//! Tracing subscriber setup
//!
//! Logs always go to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// Honors `RUST_LOG`; defaults to `info`.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
