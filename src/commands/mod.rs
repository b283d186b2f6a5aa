//! Command dispatch and handlers.

pub mod ask;
pub mod run;

use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::warn;

use crate::cli::Command;
use crate::config::Config;

/// Dispatch a parsed command to its handler.
///
/// Configuration is loaded first for every command, so a missing secret
/// stops the process before anything connects.
///
/// When `CHATRELAY_RECORD` is set to a file path, completion calls are
/// recorded to that cassette.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the handler fails.
pub fn dispatch(command: Option<&Command>) -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;

    match command {
        None | Some(Command::Run) => run::run(&config),
        Some(Command::Ask { prompt, replay }) => ask::run(&config, prompt, replay.as_deref()),
    }
}

/// How long shutdown waits for completion calls still in flight.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Builds the single-threaded runtime that hosts the event loop.
pub(crate) fn runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))
}

/// Shuts `runtime` down, abandoning blocking calls still running after `grace`.
pub(crate) fn shutdown(runtime: Runtime, grace: Duration) {
    let started = std::time::Instant::now();
    runtime.shutdown_timeout(grace);
    if started.elapsed() >= grace {
        warn!(grace_secs = grace.as_secs(), "abandoned completion calls still in flight");
    }
}
