//! Core library entry for the `chatrelay` Discord bot.

pub mod adapters;
pub mod bot;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod persona;
pub mod ports;
pub mod requester;
pub mod router;
pub mod truncate;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, configuration is
/// missing, or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version are not failures.
        Err(err) if !err.use_stderr() => return err.print().map_err(|e| e.to_string()),
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(cli.command.as_ref())
}
