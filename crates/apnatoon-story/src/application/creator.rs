//! Story creator: writes a fresh story from a reader's prompt.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use apnatoon_core::clock::Clock;
use apnatoon_core::error::{EngineError, Operation};
use apnatoon_core::event::EventMetadata;
use apnatoon_core::guard::ResetOnDrop;
use apnatoon_core::rng::DeterministicRng;
use apnatoon_core::service::{GenerationRequest, GenerativeService, request_text};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::events::{StoryEvent, StoryEventKind, StoryGenerated, StoryOperationFailed};
use crate::domain::parser::{extract_titled_story, strip_bold_markers};
use crate::domain::session::{StoryId, StorySession, Styling};

/// Subject id used on creator events; drafts have no story id yet.
pub const DRAFT_SUBJECT_ID: &str = "draft";

/// Title used when the model omits a bold title.
pub const DRAFT_FALLBACK_TITLE: &str = "My Magic Story";

/// A story written by the model, not yet opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    /// The reader's prompt.
    pub prompt: String,
    /// Raw model text.
    pub text: String,
}

impl StoryDraft {
    /// The model text with bold markers unwrapped, for display before
    /// the reader opens the story.
    #[must_use]
    pub fn preview(&self) -> String {
        strip_bold_markers(&self.text)
    }

    /// Parses the draft into a session ready to open.
    #[must_use]
    pub fn into_session(self, rng: &mut dyn DeterministicRng) -> StorySession {
        let parsed = extract_titled_story(&self.text, DRAFT_FALLBACK_TITLE);
        StorySession::new(
            StoryId::synthesized("magic", rng),
            parsed.title,
            "Magic AI",
            "Custom",
            &parsed.content,
        )
        .with_styling(Styling::magic())
    }
}

#[derive(Default)]
struct CreatorInner {
    generating: bool,
    pending_events: Vec<StoryEvent>,
}

fn lock(inner: &Mutex<CreatorInner>) -> MutexGuard<'_, CreatorInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Asks the generative service for new stories, one at a time.
pub struct StoryCreator {
    inner: Mutex<CreatorInner>,
    service: Arc<dyn GenerativeService>,
    clock: Arc<dyn Clock>,
}

impl StoryCreator {
    /// Creates an idle creator.
    #[must_use]
    pub fn new(service: Arc<dyn GenerativeService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CreatorInner::default()),
            service,
            clock,
        }
    }

    /// Whether a generation request is outstanding.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        lock(&self.inner).generating
    }

    /// Writes a story about `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank prompt,
    /// `EngineError::OperationInFlight` while another generation is
    /// outstanding, and service errors as-is.
    #[instrument(skip(self))]
    pub async fn generate(&self, prompt: &str) -> Result<StoryDraft, EngineError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(EngineError::Validation("prompt is empty".to_owned()));
        }
        {
            let mut inner = lock(&self.inner);
            if inner.generating {
                return Err(EngineError::OperationInFlight(Operation::Generation));
            }
            inner.generating = true;
        }

        let reset = ResetOnDrop::new(|| lock(&self.inner).generating = false);

        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, "requesting story");
        let request = GenerationRequest::Story {
            prompt: prompt.to_owned(),
        };
        let written = request_text(self.service.as_ref(), &request).await;

        let mut inner = lock(&self.inner);
        inner.generating = false;
        reset.disarm();
        let kind = match &written {
            Ok(_) => StoryEventKind::StoryGenerated(StoryGenerated {
                prompt: prompt.to_owned(),
            }),
            Err(error) => {
                warn!(%error, "story generation failed");
                StoryEventKind::GenerationFailed(StoryOperationFailed {
                    reason: error.to_string(),
                })
            }
        };
        let metadata = EventMetadata::new(
            kind.event_type(),
            DRAFT_SUBJECT_ID,
            correlation_id,
            self.clock.as_ref(),
        );
        inner.pending_events.push(StoryEvent { metadata, kind });

        Ok(StoryDraft {
            prompt: prompt.to_owned(),
            text: written?,
        })
    }

    /// Takes all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<StoryEvent> {
        std::mem::take(&mut lock(&self.inner).pending_events)
    }
}
