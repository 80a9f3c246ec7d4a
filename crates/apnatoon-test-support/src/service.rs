//! Test generative services — scripted `GenerativeService` implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use apnatoon_core::error::EngineError;
use apnatoon_core::service::{
    GenerationRequest, GenerativeService, SpeechPayload, SpeechRequest,
};
use async_trait::async_trait;
use tokio::sync::Semaphore;

/// A generative service that answers from queued responses and records every
/// request it receives.
///
/// Text and speech responses are queued separately and consumed in order. An
/// exhausted queue answers with `EngineError::TransportFailure`.
///
/// A gated service holds every call until the test calls [`release`], which
/// lets tests observe controllers while a request is in flight.
///
/// [`release`]: ScriptedGenerativeService::release
#[derive(Debug, Default)]
pub struct ScriptedGenerativeService {
    text_responses: Mutex<VecDeque<Result<String, EngineError>>>,
    speech_responses: Mutex<VecDeque<Result<SpeechPayload, EngineError>>>,
    text_requests: Mutex<Vec<GenerationRequest>>,
    speech_requests: Mutex<Vec<SpeechRequest>>,
    gate: Option<Semaphore>,
}

impl ScriptedGenerativeService {
    /// Create a service that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service whose calls wait for [`release`](Self::release).
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Queue a text response.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.push_text(Ok(text.to_owned()));
        self
    }

    /// Queue a text failure.
    #[must_use]
    pub fn with_text_error(self, error: EngineError) -> Self {
        self.push_text(Err(error));
        self
    }

    /// Queue a speech response carrying base64 PCM.
    #[must_use]
    pub fn with_speech(self, audio_base64: &str, sample_rate: Option<u32>) -> Self {
        self.push_speech(Ok(SpeechPayload {
            audio_base64: audio_base64.to_owned(),
            sample_rate,
        }));
        self
    }

    /// Queue a speech failure.
    #[must_use]
    pub fn with_speech_error(self, error: EngineError) -> Self {
        self.push_speech(Err(error));
        self
    }

    /// Queue a text response on a shared service.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_text(&self, response: Result<String, EngineError>) {
        self.text_responses.lock().unwrap().push_back(response);
    }

    /// Queue a speech response on a shared service.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_speech(&self, response: Result<SpeechPayload, EngineError>) {
        self.speech_responses.lock().unwrap().push_back(response);
    }

    /// Let `calls` held calls proceed. No-op on an ungated service.
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Returns a snapshot of all text requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn text_requests(&self) -> Vec<GenerationRequest> {
        self.text_requests.lock().unwrap().clone()
    }

    /// Returns a snapshot of all speech requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().unwrap().clone()
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl GenerativeService for ScriptedGenerativeService {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        self.text_requests.lock().unwrap().push(request.clone());
        self.pass_gate().await;
        self.text_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::TransportFailure("no scripted response".into())))
    }

    async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechPayload, EngineError> {
        self.speech_requests.lock().unwrap().push(request.clone());
        self.pass_gate().await;
        self.speech_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::TransportFailure("no scripted response".into())))
    }
}

/// A generative service that is never reachable. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingGenerativeService;

#[async_trait]
impl GenerativeService for FailingGenerativeService {
    async fn generate_text(&self, _request: &GenerationRequest) -> Result<String, EngineError> {
        Err(EngineError::TransportFailure("connection refused".into()))
    }

    async fn synthesize_speech(
        &self,
        _request: &SpeechRequest,
    ) -> Result<SpeechPayload, EngineError> {
        Err(EngineError::TransportFailure("connection refused".into()))
    }
}
