//! Domain events for the Quiz context.

use apnatoon_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Event type for [`QuizEventKind::QuizLoaded`].
pub const QUIZ_LOADED_EVENT_TYPE: &str = "quiz.loaded";
/// Event type for [`QuizEventKind::QuizFailed`].
pub const QUIZ_FAILED_EVENT_TYPE: &str = "quiz.failed";
/// Event type for [`QuizEventKind::AnswerRecorded`].
pub const ANSWER_RECORDED_EVENT_TYPE: &str = "quiz.answer_recorded";
/// Event type for [`QuizEventKind::QuestionAdvanced`].
pub const QUESTION_ADVANCED_EVENT_TYPE: &str = "quiz.question_advanced";
/// Event type for [`QuizEventKind::QuizCompleted`].
pub const QUIZ_COMPLETED_EVENT_TYPE: &str = "quiz.completed";
/// Event type for [`QuizEventKind::QuizClosed`].
pub const QUIZ_CLOSED_EVENT_TYPE: &str = "quiz.closed";

/// Emitted when questions are ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizLoaded {
    /// Number of questions.
    pub question_count: usize,
}

/// Emitted when no quiz could be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizFailed {
    /// Human-readable cause.
    pub reason: String,
}

/// Emitted when an answer is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecorded {
    /// Zero-based question index.
    pub question_index: usize,
    /// Whether the answer was right.
    pub correct: bool,
}

/// Emitted when the next question is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAdvanced {
    /// Zero-based index of the new question.
    pub question_index: usize,
}

/// Emitted when the last question is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCompleted {
    /// Correct answers.
    pub score: usize,
    /// Questions asked.
    pub total: usize,
}

/// Event payload variants for the Quiz context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizEventKind {
    /// Questions are ready.
    QuizLoaded(QuizLoaded),
    /// The quiz is in its error state.
    QuizFailed(QuizFailed),
    /// An answer was recorded.
    AnswerRecorded(AnswerRecorded),
    /// The next question is showing.
    QuestionAdvanced(QuestionAdvanced),
    /// The score is final.
    QuizCompleted(QuizCompleted),
    /// The quiz was dismissed.
    QuizClosed,
}

impl QuizEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::QuizLoaded(_) => QUIZ_LOADED_EVENT_TYPE,
            Self::QuizFailed(_) => QUIZ_FAILED_EVENT_TYPE,
            Self::AnswerRecorded(_) => ANSWER_RECORDED_EVENT_TYPE,
            Self::QuestionAdvanced(_) => QUESTION_ADVANCED_EVENT_TYPE,
            Self::QuizCompleted(_) => QUIZ_COMPLETED_EVENT_TYPE,
            Self::QuizClosed => QUIZ_CLOSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Quiz context.
#[derive(Debug, Clone)]
pub struct QuizEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: QuizEventKind,
}

impl DomainEvent for QuizEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
