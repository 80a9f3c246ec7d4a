//! Domain events for the Narration context.

use apnatoon_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Event type for [`PlaybackEventKind::NarrationStarted`].
pub const NARRATION_STARTED_EVENT_TYPE: &str = "narration.started";
/// Event type for [`PlaybackEventKind::NarrationFinished`].
pub const NARRATION_FINISHED_EVENT_TYPE: &str = "narration.finished";
/// Event type for [`PlaybackEventKind::NarrationStopped`].
pub const NARRATION_STOPPED_EVENT_TYPE: &str = "narration.stopped";
/// Event type for [`PlaybackEventKind::NarrationFailed`].
pub const NARRATION_FAILED_EVENT_TYPE: &str = "narration.failed";

/// Emitted when narration audio starts playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationStarted {
    /// Size of the encoded container in bytes.
    pub container_bytes: usize,
    /// Sample rate written into the container.
    pub sample_rate: u32,
}

/// Emitted when narration could not be fetched or played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationFailed {
    /// Human-readable cause.
    pub reason: String,
}

/// Event payload variants for the Narration context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    /// Audio is playing.
    NarrationStarted(NarrationStarted),
    /// Audio reached its natural end.
    NarrationFinished,
    /// Playback or loading was cut short.
    NarrationStopped,
    /// Loading failed; nothing is playing.
    NarrationFailed(NarrationFailed),
}

impl PlaybackEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NarrationStarted(_) => NARRATION_STARTED_EVENT_TYPE,
            Self::NarrationFinished => NARRATION_FINISHED_EVENT_TYPE,
            Self::NarrationStopped => NARRATION_STOPPED_EVENT_TYPE,
            Self::NarrationFailed(_) => NARRATION_FAILED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Narration context.
#[derive(Debug, Clone)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
