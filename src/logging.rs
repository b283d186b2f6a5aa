//! Tracing initialization.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once keeps the first subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
