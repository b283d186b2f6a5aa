//! Completion requests with a guaranteed chat-displayable answer.
//!
//! The completion API is blocking, so every call runs on the runtime's
//! blocking pool behind a semaphore. Failures become a [`CompletionResult`]
//! at the call boundary and are turned into reply text in exactly one place,
//! [`Requester::get_response`].

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::persona::{Persona, NO_RESPONSE};
use crate::ports::completion::{ChatMessage, CompletionApi, CompletionRequest};
use crate::truncate::truncate_smart;

const PREVIEW_CHARS: usize = 50;

/// Outcome of one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    /// The API returned text (possibly blank).
    Success(String),
    /// The call failed; the detail is shown to the user.
    Failure(String),
}

/// Turns prompts into bounded replies through a [`CompletionApi`].
pub struct Requester {
    api: Arc<dyn CompletionApi>,
    persona: Arc<Persona>,
    workers: Arc<Semaphore>,
}

impl Requester {
    /// Creates a requester allowing `workers` concurrent API calls.
    ///
    /// A `workers` value of zero is raised to one.
    #[must_use]
    pub fn new(api: Arc<dyn CompletionApi>, persona: Arc<Persona>, workers: usize) -> Self {
        Self { api, persona, workers: Arc::new(Semaphore::new(workers.max(1))) }
    }

    /// The persona used for instructions and fallback wording.
    #[must_use]
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Builds the API request for a prompt.
    #[must_use]
    pub fn build_request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.persona.model.clone(),
            messages: vec![
                ChatMessage::system(self.persona.instructions()),
                ChatMessage::user(prompt),
            ],
            max_tokens: self.persona.max_tokens,
            temperature: self.persona.temperature,
            top_p: self.persona.top_p,
            stream: false,
        }
    }

    /// Runs one completion call on the blocking pool.
    pub async fn request(&self, prompt: &str) -> CompletionResult {
        let Ok(permit) = Arc::clone(&self.workers).acquire_owned().await else {
            return CompletionResult::Failure("completion worker pool is closed".into());
        };

        let api = Arc::clone(&self.api);
        let request = self.build_request(prompt);
        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            api.complete(&request)
        })
        .await;

        match joined {
            Ok(Ok(text)) => CompletionResult::Success(text),
            Ok(Err(e)) => CompletionResult::Failure(e.to_string()),
            Err(e) => CompletionResult::Failure(format!("completion worker failed: {e}")),
        }
    }

    /// Returns the reply for `prompt`. Never fails: errors become fallback text.
    pub async fn get_response(&self, prompt: &str) -> String {
        let preview: String = prompt.chars().take(PREVIEW_CHARS).collect();
        info!(prompt = %preview, "requesting completion");

        match self.request(prompt).await {
            CompletionResult::Success(text) if !text.trim().is_empty() => {
                let reply = truncate_smart(&text, self.persona.reply_limit);
                debug!(chars = reply.chars().count(), reply = %reply, "completion bounded");
                reply
            }
            CompletionResult::Success(_) => {
                warn!("completion returned blank text");
                NO_RESPONSE.to_owned()
            }
            CompletionResult::Failure(detail) => {
                warn!(error = %detail, "completion failed");
                self.persona.unavailable(&detail)
            }
        }
    }
}
