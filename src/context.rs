//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::adapters::live::{DiscordRest, GroqCompletionApi};
use crate::adapters::recording::RecordingCompletionApi;
use crate::adapters::replaying::ReplayingCompletionApi;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::chat::ChatPlatform;
use crate::ports::completion::CompletionApi;

/// Bundles the adapters used by one process.
///
/// Built once at startup and shared by reference; constructors wire up
/// different adapter implementations (live, recording, replaying).
///
/// Build and drop it outside the async runtime: the live completion adapter
/// owns a blocking HTTP client.
pub struct ServiceContext {
    /// Completion API for generating replies.
    pub completion: Arc<dyn CompletionApi>,
    /// Chat platform for typing indicators and replies.
    pub chat: Arc<dyn ChatPlatform>,
    /// Optional cassette recorder; appends each call as it happens.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a live context. When `config.record_path` is set, completion
    /// calls are also recorded to that cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn live(config: &Config) -> Result<Self, String> {
        let groq = GroqCompletionApi::new(config.groq_api_key.clone(), &config.groq_api_base)
            .map_err(|e| e.to_string())?;
        let chat = Arc::new(DiscordRest::new(config.discord_token.clone(), &config.discord_api_base));

        let Some(path) = &config.record_path else {
            return Ok(Self { completion: Arc::new(groq), chat, recorder: None });
        };

        info!(path = %path.display(), "recording completion calls");
        let recorder = CassetteRecorder::create(path, "chatrelay-session")
            .map_err(|e| format!("failed to create cassette {}: {e}", path.display()))?;
        let recorder = Arc::new(Mutex::new(recorder));
        Ok(Self {
            completion: Arc::new(RecordingCompletionApi::new(
                Arc::new(groq),
                Arc::clone(&recorder),
            )),
            chat,
            recorder: Some(recorder),
        })
    }

    /// Creates a context whose completions are served from a cassette file.
    /// Chat actions still go to the live platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(config: &Config, cassette: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(cassette)?;
        Ok(Self {
            completion: Arc::new(ReplayingCompletionApi::new(CassetteReplayer::new(&cassette))),
            chat: Arc::new(DiscordRest::new(config.discord_token.clone(), &config.discord_api_base)),
            recorder: None,
        })
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let recorder = recorder.lock().unwrap_or_else(PoisonError::into_inner);
        info!(
            path = %recorder.path().display(),
            interactions = recorder.len(),
            "recording saved"
        );
    }
}
