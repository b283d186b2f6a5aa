//! Recording adapter for the `CompletionApi` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::CompletionError;
use crate::ports::completion::{CompletionApi, CompletionRequest};

/// Records completion calls while delegating to an inner implementation.
pub struct RecordingCompletionApi {
    inner: Arc<dyn CompletionApi>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingCompletionApi {
    /// Creates a recording client wrapping the given implementation.
    pub fn new(inner: Arc<dyn CompletionApi>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl CompletionApi for RecordingCompletionApi {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let result = self.inner.complete(request);
        record_result(&self.recorder, "completion", "complete", request, &result);
        result
    }
}
