//! Completion API port for chat-completion requests.

use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// One chat message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"system"` or `"user"`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system-role message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    /// Creates a user-role message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

/// A single non-streaming chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier (e.g. `"llama-3.3-70b-versatile"`).
    pub model: String,
    /// System instructions followed by the user prompt.
    pub messages: Vec<ChatMessage>,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus-sampling probability mass.
    pub top_p: f32,
    /// Always `false`; replies are read in one piece.
    pub stream: bool,
}

/// Sends completion requests to a hosted model.
///
/// Calls block the current thread until the API answers. Async callers must
/// run them on a blocking worker.
pub trait CompletionApi: Send + Sync {
    /// Returns the generated text of the first choice. A choice without
    /// content yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (network, auth, rate-limit,
    /// malformed response).
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
