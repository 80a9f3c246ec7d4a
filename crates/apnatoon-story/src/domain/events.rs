//! Domain events for the Story context.

use apnatoon_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Event type for [`StoryEventKind::StoryOpened`].
pub const STORY_OPENED_EVENT_TYPE: &str = "story.opened";
/// Event type for [`StoryEventKind::StoryClosed`].
pub const STORY_CLOSED_EVENT_TYPE: &str = "story.closed";
/// Event type for [`StoryEventKind::StoryTranslated`].
pub const STORY_TRANSLATED_EVENT_TYPE: &str = "story.translated";
/// Event type for [`StoryEventKind::TranslationReverted`].
pub const TRANSLATION_REVERTED_EVENT_TYPE: &str = "story.translation_reverted";
/// Event type for [`StoryEventKind::TranslationFailed`].
pub const TRANSLATION_FAILED_EVENT_TYPE: &str = "story.translation_failed";
/// Event type for [`StoryEventKind::SequelChained`].
pub const SEQUEL_CHAINED_EVENT_TYPE: &str = "story.sequel_chained";
/// Event type for [`StoryEventKind::SequelFailed`].
pub const SEQUEL_FAILED_EVENT_TYPE: &str = "story.sequel_failed";
/// Event type for [`StoryEventKind::StoryGenerated`].
pub const STORY_GENERATED_EVENT_TYPE: &str = "story.generated";
/// Event type for [`StoryEventKind::GenerationFailed`].
pub const GENERATION_FAILED_EVENT_TYPE: &str = "story.generation_failed";

/// Emitted when a story becomes the open story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOpened {
    /// Display title.
    pub title: String,
    /// Number of paragraphs.
    pub paragraph_count: usize,
}

/// Emitted when the open story's text is replaced by a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTranslated {
    /// Target language name.
    pub language: String,
}

/// Emitted when a sequel replaces the open story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequelChained {
    /// Id of the story that was continued.
    pub previous_id: String,
    /// Title of the sequel.
    pub title: String,
    /// Whether the title came from the model or the fallback.
    pub title_from_model: bool,
}

/// Emitted when a fresh story has been written from a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryGenerated {
    /// Prompt the reader supplied.
    pub prompt: String,
}

/// Emitted when a generative request for the Story context fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOperationFailed {
    /// Human-readable cause.
    pub reason: String,
}

/// Event payload variants for the Story context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryEventKind {
    /// A story was opened.
    StoryOpened(StoryOpened),
    /// The open story was closed.
    StoryClosed,
    /// A translation is being shown.
    StoryTranslated(StoryTranslated),
    /// The untranslated text is back.
    TranslationReverted,
    /// Translation failed; the story is unchanged.
    TranslationFailed(StoryOperationFailed),
    /// A sequel became the open story.
    SequelChained(SequelChained),
    /// Sequel generation failed; the story is unchanged.
    SequelFailed(StoryOperationFailed),
    /// A draft story was written.
    StoryGenerated(StoryGenerated),
    /// Story generation failed.
    GenerationFailed(StoryOperationFailed),
}

impl StoryEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StoryOpened(_) => STORY_OPENED_EVENT_TYPE,
            Self::StoryClosed => STORY_CLOSED_EVENT_TYPE,
            Self::StoryTranslated(_) => STORY_TRANSLATED_EVENT_TYPE,
            Self::TranslationReverted => TRANSLATION_REVERTED_EVENT_TYPE,
            Self::TranslationFailed(_) => TRANSLATION_FAILED_EVENT_TYPE,
            Self::SequelChained(_) => SEQUEL_CHAINED_EVENT_TYPE,
            Self::SequelFailed(_) => SEQUEL_FAILED_EVENT_TYPE,
            Self::StoryGenerated(_) => STORY_GENERATED_EVENT_TYPE,
            Self::GenerationFailed(_) => GENERATION_FAILED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Story context.
#[derive(Debug, Clone)]
pub struct StoryEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StoryEventKind,
}

impl DomainEvent for StoryEvent {
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
