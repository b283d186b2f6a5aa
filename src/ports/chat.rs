//! Chat platform port for inbound message data and outbound actions.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Boxed future type alias used by [`ChatPlatform`] to keep the trait dyn-compatible.
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ChatError>> + Send + 'a>>;

/// The author of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Platform user ID.
    pub id: String,
    /// Display handle.
    pub username: String,
    /// Whether the author is a bot account.
    #[serde(default)]
    pub bot: bool,
}

/// A message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Message ID, used as the reply target.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Server the channel belongs to; `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Who wrote it.
    pub author: Author,
    /// Raw text, including any mention tokens.
    #[serde(default)]
    pub content: String,
    /// IDs of users mentioned in the message.
    #[serde(default)]
    pub mentions: Vec<String>,
}

impl IncomingMessage {
    /// Whether the message was sent in a one-to-one channel.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }

    /// Whether the given user is mentioned.
    #[must_use]
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|id| id == user_id)
    }
}

/// The bot's own account, learned when the gateway session is ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotIdentity {
    /// Bot user ID.
    pub id: String,
    /// Bot username.
    pub username: String,
}

/// Performs outbound actions on the chat platform.
pub trait ChatPlatform: Send + Sync {
    /// Shows the typing indicator in a channel for a few seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn send_typing(&self, channel_id: &str) -> ChatFuture<'_>;

    /// Posts `content` as a reply to `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn reply(&self, message: &IncomingMessage, content: &str) -> ChatFuture<'_>;
}
