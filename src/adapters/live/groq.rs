//! Live adapter for the `CompletionApi` port using Groq's OpenAI-compatible API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::CompletionError;
use crate::ports::completion::{CompletionApi, CompletionRequest};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Live completion client that calls `{base}/chat/completions`.
///
/// Uses the blocking `reqwest` client; construct and call it outside async
/// contexts (the requester runs calls on the blocking pool).
pub struct GroqCompletionApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqCompletionApi {
    /// Creates a client for the given key and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized (TLS backend).
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Top-level response from the chat-completions endpoint.
#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Error body returned by OpenAI-compatible APIs.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl CompletionApi for GroqCompletionApi {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CompletionError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Status { status: status.as_u16(), message });
        }

        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| CompletionError::Decode(e.to_string()))?;

        let first = completion.choices.into_iter().next().ok_or(CompletionError::NoChoices)?;
        Ok(first.message.content.unwrap_or_default())
    }
}
