//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `chatrelay`.
#[derive(Debug, Parser)]
#[command(name = "chatrelay", version, about = "Relay Discord messages to a hosted language model")]
pub struct Cli {
    /// The command to execute; defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to Discord and answer messages until interrupted.
    Run,
    /// Send one prompt through the completion pipeline and print the reply.
    Ask {
        /// Prompt text.
        prompt: String,
        /// Serve completions from a recorded cassette instead of the API.
        #[arg(long, value_name = "CASSETTE")]
        replay: Option<PathBuf>,
    },
}
