//! Process configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (see `main`), so
//! values may come from either place. Both secrets are required; the process
//! refuses to start without them.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::gateway::GATEWAY_URL;
use crate::persona::Persona;

/// Default Discord REST base URL.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
/// Default Groq OpenAI-compatible base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

const DEFAULT_COMMAND_PREFIX: &str = "emb";
const DEFAULT_COMMAND_NAME: &str = "m";
const DEFAULT_WORKERS: usize = 4;

/// Settings for one bot process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (`DISCORD_BOT_TOKEN`).
    pub discord_token: String,
    /// Groq API key (`GROQ_API_KEY`).
    pub groq_api_key: String,
    /// Assistant persona (`CHATRELAY_PERSONA`, or the built-in default).
    pub persona: Persona,
    /// Command prefix (`CHATRELAY_COMMAND_PREFIX`).
    pub command_prefix: String,
    /// Command name following the prefix (`CHATRELAY_COMMAND_NAME`).
    pub command_name: String,
    /// Concurrent completion calls allowed (`CHATRELAY_WORKERS`).
    pub workers: usize,
    /// Completion API base URL (`GROQ_API_BASE`).
    pub groq_api_base: String,
    /// Discord REST base URL (`DISCORD_API_BASE`).
    pub discord_api_base: String,
    /// Discord gateway websocket URL (`DISCORD_GATEWAY_URL`).
    pub gateway_url: String,
    /// Cassette path for recording completion calls (`CHATRELAY_RECORD`).
    pub record_path: Option<PathBuf>,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a secret is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a secret is missing or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let discord_token = get("DISCORD_BOT_TOKEN").ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;
        let groq_api_key = get("GROQ_API_KEY").ok_or(ConfigError::Missing("GROQ_API_KEY"))?;

        let persona = match get("CHATRELAY_PERSONA") {
            Some(path) => Persona::load(&PathBuf::from(path))?,
            None => Persona::default(),
        };

        let workers = match get("CHATRELAY_WORKERS") {
            Some(raw) => parse_workers(&raw)?,
            None => DEFAULT_WORKERS,
        };

        Ok(Self {
            discord_token,
            groq_api_key,
            persona,
            command_prefix: get("CHATRELAY_COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.into()),
            command_name: get("CHATRELAY_COMMAND_NAME")
                .unwrap_or_else(|| DEFAULT_COMMAND_NAME.into()),
            workers,
            groq_api_base: get("GROQ_API_BASE").unwrap_or_else(|| GROQ_API_BASE.into()),
            discord_api_base: get("DISCORD_API_BASE").unwrap_or_else(|| DISCORD_API_BASE.into()),
            gateway_url: get("DISCORD_GATEWAY_URL").unwrap_or_else(|| GATEWAY_URL.into()),
            record_path: get("CHATRELAY_RECORD").map(PathBuf::from),
        })
    }
}

fn parse_workers(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            name: "CHATRELAY_WORKERS",
            reason: "must be at least 1".into(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid { name: "CHATRELAY_WORKERS", reason: e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn both_secrets_give_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "d"), ("GROQ_API_KEY", "g")]))
                .unwrap();
        assert_eq!(config.discord_token, "d");
        assert_eq!(config.groq_api_key, "g");
        assert_eq!(config.command_prefix, "emb");
        assert_eq!(config.command_name, "m");
        assert_eq!(config.workers, 4);
        assert_eq!(config.groq_api_base, GROQ_API_BASE);
        assert_eq!(config.gateway_url, GATEWAY_URL);
        assert!(config.record_path.is_none());
        assert_eq!(config.persona, Persona::default());
    }

    #[test]
    fn missing_discord_token_is_fatal() {
        let err = Config::from_lookup(lookup(&[("GROQ_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCORD_BOT_TOKEN")));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "d"), ("GROQ_API_KEY", "  ")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "GROQ_API_KEY environment variable is required");
    }

    #[test]
    fn zero_workers_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "d"),
            ("GROQ_API_KEY", "g"),
            ("CHATRELAY_WORKERS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CHATRELAY_WORKERS", .. }));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "d"),
            ("GROQ_API_KEY", "g"),
            ("CHATRELAY_COMMAND_PREFIX", "!"),
            ("CHATRELAY_COMMAND_NAME", "ask"),
            ("CHATRELAY_WORKERS", "2"),
            ("CHATRELAY_RECORD", "/tmp/session.cassette.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.command_name, "ask");
        assert_eq!(config.workers, 2);
        assert_eq!(config.record_path, Some(PathBuf::from("/tmp/session.cassette.yaml")));
    }
}
