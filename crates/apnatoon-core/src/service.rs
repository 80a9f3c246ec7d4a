//! Generative service contract.
//!
//! The engine never talks to a transport directly. A host supplies an
//! implementation of [`GenerativeService`] that turns each request into a
//! model call and hands back the raw text or speech payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A text-producing request intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum GenerationRequest {
    /// Write a fresh story about a reader-supplied prompt.
    Story {
        /// What the story should be about.
        prompt: String,
    },
    /// Continue an existing story.
    Sequel {
        /// Title of the story being continued.
        title: String,
        /// Bounded tail of the story's text.
        excerpt: String,
    },
    /// Translate story text.
    Translation {
        /// Text to translate.
        text: String,
        /// Target language name.
        language: String,
    },
    /// Build multiple-choice questions about story text.
    Quiz {
        /// Text the questions are about.
        text: String,
        /// How many questions to ask for.
        question_count: usize,
    },
}

impl GenerationRequest {
    /// Returns a short name for logging.
    #[must_use]
    pub fn intent(&self) -> &'static str {
        match self {
            Self::Story { .. } => "generate_story",
            Self::Sequel { .. } => "generate_sequel",
            Self::Translation { .. } => "translate",
            Self::Quiz { .. } => "generate_quiz",
        }
    }

    /// Renders the model instruction for this request.
    #[must_use]
    pub fn instruction(&self) -> String {
        match self {
            Self::Story { prompt } => format!(
                "Write a short, fun children's story (150 words) about: \"{prompt}\". Catchy title in bold."
            ),
            Self::Sequel { title, excerpt } => format!(
                "Continue this children's story: \"{title}\". The previous part ended with: \"{excerpt}\". \
                 Write a short, fun sequel (100-150 words). Start with a bold title like \"**{title}: Part 2**\"."
            ),
            Self::Translation { text, language } => format!(
                "Translate the following children's story to {language}. Keep it simple, fun, and suitable \
                 for kids. Return ONLY the translated text. Story: \"{text}\""
            ),
            Self::Quiz {
                text,
                question_count,
            } => format!(
                "Generate {question_count} multiple-choice questions for children based on this story. \
                 Return the output as a RAW JSON Array (no markdown code blocks). Format: \
                 [{{\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \
                 \"correctAnswer\": \"The exact string of the correct option\"}}]. Story: \"{text}\""
            ),
        }
    }
}

/// A speech synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to narrate.
    pub text: String,
    /// Prebuilt voice name.
    pub voice: String,
}

/// Raw narration audio returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechPayload {
    /// Base64-encoded 16-bit signed little-endian mono PCM.
    pub audio_base64: String,
    /// Sample rate, when the service reports one.
    pub sample_rate: Option<u32>,
}

/// The remote generative text/speech service.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Produce text for a request.
    ///
    /// Implementations return `EngineError::TransportFailure` when the
    /// service cannot be reached and `EngineError::EmptyResponse` when it
    /// answers without text.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, EngineError>;

    /// Produce narration audio for text.
    async fn synthesize_speech(&self, request: &SpeechRequest)
    -> Result<SpeechPayload, EngineError>;
}

/// Calls the service and rejects blank answers as `EmptyResponse`.
///
/// # Errors
///
/// Returns the service error, or `EngineError::EmptyResponse` if the text is
/// empty after trimming.
pub async fn request_text(
    service: &dyn GenerativeService,
    request: &GenerationRequest,
) -> Result<String, EngineError> {
    let text = service.generate_text(request).await?;
    if text.trim().is_empty() {
        return Err(EngineError::EmptyResponse);
    }
    Ok(text)
}
