//! Engine error types.

use std::fmt;

use thiserror::Error;

/// An asynchronous engine operation that gates re-entry into itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Generating a fresh story from a prompt.
    Generation,
    /// Chaining a sequel onto the open story.
    Sequel,
    /// Translating the open story.
    Translation,
    /// Fetching quiz questions.
    Quiz,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generation => "story generation",
            Self::Sequel => "sequel generation",
            Self::Translation => "translation",
            Self::Quiz => "quiz generation",
        };
        f.write_str(name)
    }
}

/// Top-level engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The generative service could not be reached.
    #[error("generative service unreachable: {0}")]
    TransportFailure(String),

    /// The generative service answered without usable text or audio.
    #[error("generative service returned no usable content")]
    EmptyResponse,

    /// Quiz text was present but did not decode to a valid question list.
    #[error("malformed quiz: {0}")]
    MalformedQuiz(String),

    /// Narration audio could not be fetched, decoded, or played.
    #[error("narration failed: {0}")]
    NarrationFailed(String),

    /// The platform audio output rejected a request.
    #[error("audio output error: {0}")]
    AudioOutput(String),

    /// The operation needs an open story.
    #[error("no story is open")]
    NoActiveStory,

    /// The operation is already running and rejects re-entry.
    #[error("{0} is already in progress")]
    OperationInFlight(Operation),

    /// Caller input was rejected.
    #[error("validation error: {0}")]
    Validation(String),
}
