//! Live adapter for the `ChatPlatform` port using the Discord REST API.

use reqwest::Client;
use serde::Serialize;

use crate::error::ChatError;
use crate::ports::chat::{ChatFuture, ChatPlatform, IncomingMessage};

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

/// Live chat client for Discord channels.
pub struct DiscordRest {
    client: Client,
    token: String,
    base_url: String,
}

impl DiscordRest {
    /// Creates a client authenticated with a bot token.
    #[must_use]
    pub fn new(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn check(response: reqwest::Response) -> Result<(), ChatError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ChatError::Status { status: status.as_u16(), message })
    }
}

/// Body of a create-message request.
#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    message_reference: MessageReference<'a>,
}

#[derive(Serialize)]
struct MessageReference<'a> {
    message_id: &'a str,
    fail_if_not_exists: bool,
}

fn clip(content: &str) -> &str {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((byte, _)) => &content[..byte],
        None => content,
    }
}

impl ChatPlatform for DiscordRest {
    fn send_typing(&self, channel_id: &str) -> ChatFuture<'_> {
        let url = format!("{}/channels/{channel_id}/typing", self.base_url);

        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header("Authorization", self.auth())
                .header("Content-Length", "0")
                .send()
                .await
                .map_err(|e| ChatError::Transport(e.to_string()))?;
            Self::check(response).await
        })
    }

    fn reply(&self, message: &IncomingMessage, content: &str) -> ChatFuture<'_> {
        let url = format!("{}/channels/{}/messages", self.base_url, message.channel_id);
        let message_id = message.id.clone();
        let content = clip(content).to_owned();

        Box::pin(async move {
            let body = CreateMessage {
                content: &content,
                message_reference: MessageReference {
                    message_id: &message_id,
                    fail_if_not_exists: false,
                },
            };
            let response = self
                .client
                .post(url)
                .header("Authorization", self.auth())
                .json(&body)
                .send()
                .await
                .map_err(|e| ChatError::Transport(e.to_string()))?;
            Self::check(response).await
        })
    }
}
