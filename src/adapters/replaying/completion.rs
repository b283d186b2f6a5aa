//! Replaying adapter for the `CompletionApi` port.

use std::sync::{Mutex, PoisonError};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::CompletionError;
use crate::ports::completion::{CompletionApi, CompletionRequest};

/// Serves recorded completions from a cassette, in recorded order.
pub struct ReplayingCompletionApi {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingCompletionApi {
    /// Creates a replaying client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl CompletionApi for ReplayingCompletionApi {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        let output = {
            let mut replayer = self.replayer.lock().unwrap_or_else(PoisonError::into_inner);
            replayer
                .next_interaction("completion", "complete")
                .map_err(CompletionError::CassetteExhausted)?
                .output
                .clone()
        };
        replay_result(&output)
    }
}

/// Decode an `{"Ok": text}` / `{"Err": message}` recorded output.
fn replay_result(output: &serde_json::Value) -> Result<String, CompletionError> {
    if let Some(text) = output.get("Ok") {
        return serde_json::from_value(text.clone())
            .map_err(|e| CompletionError::Decode(format!("recorded completion: {e}")));
    }
    if let Some(message) = output.get("Err").and_then(serde_json::Value::as_str) {
        return Err(CompletionError::Replayed(message.to_owned()));
    }
    Err(CompletionError::Decode(format!("recorded output has neither Ok nor Err: {output}")))
}
