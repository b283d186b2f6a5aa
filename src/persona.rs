//! Assistant persona: instruction text, sampling settings and reply wording.
//!
//! The persona is a YAML document so the instructions can be versioned and
//! reviewed separately from the code. Every field is optional; missing ones
//! take the built-in defaults.
//!
//! ```yaml
//! name: Relay Bot
//! system_prompt: |
//!   You are {name}, a helpful assistant on Discord.
//! max_tokens: 70
//! temperature: 0.7
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::truncate::DEFAULT_LIMIT;

/// Prompt used when a message contains nothing but a mention.
pub const DEFAULT_PROMPT: &str = "Hi! How can I help you today?";

/// Reply used when the model returns blank text.
pub const NO_RESPONSE: &str = "I received your message but couldn't generate a response.";

/// Reply used when the command path fails.
pub const COMMAND_APOLOGY: &str = "Sorry, I'm having technical difficulties right now!";

const DEFAULT_NAME: &str = "Chat Relay";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, friendly, and intelligent AI assistant \
on Discord called {name}. Give clear, accurate, and engaging responses in 1-2 concise sentences \
(max 250 characters). Be conversational but informative.";

/// Instruction and sampling settings for the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Persona {
    /// Display name, used in instructions and fallback replies.
    pub name: String,
    /// System instructions. `{name}` is replaced with [`Persona::name`].
    pub system_prompt: String,
    /// Model identifier sent to the completion API.
    pub model: String,
    /// Output token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus-sampling probability mass.
    pub top_p: f32,
    /// Maximum reply length in characters.
    pub reply_limit: usize,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: 70,
            temperature: 0.7,
            top_p: 1.0,
            reply_limit: DEFAULT_LIMIT,
        }
    }
}

impl Persona {
    /// Loads a persona from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid persona
    /// document, or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::PersonaRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|err| match err {
            ConfigError::PersonaParse { source, .. } => {
                ConfigError::PersonaParse { path: path.display().to_string(), source }
            }
            other => other,
        })
    }

    /// Parses a persona from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid persona document or holds
    /// out-of-range values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let persona: Self = serde_yaml::from_str(yaml)
            .map_err(|source| ConfigError::PersonaParse { path: "<inline>".into(), source })?;
        persona.validate()?;
        Ok(persona)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reply_limit == 0 {
            return Err(ConfigError::Invalid {
                name: "reply_limit",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                name: "max_tokens",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// System instructions with the display name filled in.
    #[must_use]
    pub fn instructions(&self) -> String {
        self.system_prompt.replace("{name}", &self.name)
    }

    /// Reply used when the completion API fails.
    #[must_use]
    pub fn unavailable(&self, detail: &str) -> String {
        format!(
            "{} is currently unavailable, try using me later.. Error details: {detail}",
            self.name
        )
    }

    /// Reply used when the passive path fails.
    #[must_use]
    pub fn passive_apology(&self) -> String {
        format!("{} is broken, wait for a fix!", self.name)
    }
}
