//! Story session controller.
//!
//! Holds the one open [`StorySession`] and runs the translate toggle and
//! sequel chaining against it. Every `open` or `close` bumps a generation
//! counter; a response that lands after the generation moved on is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use apnatoon_audio::application::playback::{PlaybackController, PlaybackOutcome};
use apnatoon_core::clock::Clock;
use apnatoon_core::config::EngineConfig;
use apnatoon_core::error::{EngineError, Operation};
use apnatoon_core::event::EventMetadata;
use apnatoon_core::guard::ResetOnDrop;
use apnatoon_core::rng::SharedRng;
use apnatoon_core::service::{GenerationRequest, GenerativeService, request_text};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::events::{
    SequelChained, StoryEvent, StoryEventKind, StoryOpened, StoryOperationFailed, StoryTranslated,
};
use crate::domain::parser::{TitleSource, extract_titled_story};
use crate::domain::session::{StoryId, StorySession, Styling};

/// Author credited on chained sequels.
pub const SEQUEL_AUTHOR: &str = "Gemini ✨";

/// How a `translate_toggle` call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The translation is now shown.
    Translated,
    /// The cached original is shown again.
    Reverted,
    /// The story changed while the request was out; nothing was applied.
    Superseded,
}

/// How a `chain_sequel` call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequelOutcome {
    /// The sequel is now the open story.
    Opened(StoryId),
    /// The story changed while the request was out; nothing was opened.
    Superseded,
}

struct SessionInner {
    current: Option<StorySession>,
    generation: u64,
    translating: bool,
    sequel_loading: bool,
    pending_events: Vec<StoryEvent>,
}

impl SessionInner {
    fn record(
        &mut self,
        subject_id: &str,
        correlation_id: Uuid,
        kind: StoryEventKind,
        clock: &dyn Clock,
    ) {
        let metadata = EventMetadata::new(kind.event_type(), subject_id, correlation_id, clock);
        self.pending_events.push(StoryEvent { metadata, kind });
    }

    fn current(&self) -> Result<&StorySession, EngineError> {
        self.current.as_ref().ok_or(EngineError::NoActiveStory)
    }
}

fn lock(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the story currently being read.
pub struct StorySessionController {
    inner: Mutex<SessionInner>,
    service: Arc<dyn GenerativeService>,
    playback: Arc<PlaybackController>,
    clock: Arc<dyn Clock>,
    rng: SharedRng,
    translation_language: String,
    sequel_excerpt_chars: usize,
}

impl StorySessionController {
    /// Creates a controller with no open story.
    #[must_use]
    pub fn new(
        service: Arc<dyn GenerativeService>,
        playback: Arc<PlaybackController>,
        clock: Arc<dyn Clock>,
        rng: SharedRng,
        config: &EngineConfig,
    ) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                current: None,
                generation: 0,
                translating: false,
                sequel_loading: false,
                pending_events: Vec::new(),
            }),
            service,
            playback,
            clock,
            rng,
            translation_language: config.translation_language.clone(),
            sequel_excerpt_chars: config.sequel_excerpt_chars,
        }
    }

    /// Makes `session` the open story.
    ///
    /// Narration is stopped, any translation cache on the incoming session is
    /// dropped, and in-flight translation or sequel requests for the previous
    /// story are orphaned.
    #[instrument(skip(self, session), fields(story_id = %session.id))]
    pub fn open(&self, session: StorySession) {
        let mut inner = lock(&self.inner);
        self.replace(&mut inner, session, Uuid::new_v4());
    }

    /// Discards the open story. Returns `false` if none was open.
    pub fn close(&self) -> bool {
        let mut inner = lock(&self.inner);
        self.playback.stop();
        inner.generation += 1;
        inner.translating = false;
        inner.sequel_loading = false;
        let Some(closed) = inner.current.take() else {
            return false;
        };
        inner.record(
            closed.id.as_str(),
            Uuid::new_v4(),
            StoryEventKind::StoryClosed,
            self.clock.as_ref(),
        );
        info!(story_id = %closed.id, "story closed");
        true
    }

    /// A snapshot of the open story.
    #[must_use]
    pub fn current(&self) -> Option<StorySession> {
        lock(&self.inner).current.clone()
    }

    /// Whether a translation request is outstanding.
    #[must_use]
    pub fn is_translating(&self) -> bool {
        lock(&self.inner).translating
    }

    /// Whether a sequel request is outstanding.
    #[must_use]
    pub fn is_sequel_loading(&self) -> bool {
        lock(&self.inner).sequel_loading
    }

    /// Shows a translation of the open story, or reverts to the cached
    /// original if a translation is already shown.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveStory` without an open story and
    /// `EngineError::OperationInFlight` while a translation is outstanding.
    /// Service failures are returned after recording a notice; the story is
    /// left unchanged.
    #[instrument(skip(self))]
    pub async fn translate_toggle(&self) -> Result<TranslationOutcome, EngineError> {
        let correlation_id = Uuid::new_v4();
        let (generation, subject_id, request) = {
            let mut inner = lock(&self.inner);
            if inner.translating {
                return Err(EngineError::OperationInFlight(Operation::Translation));
            }
            let Some(session) = inner.current.as_mut() else {
                return Err(EngineError::NoActiveStory);
            };
            if session.revert_translation() {
                let subject_id = session.id.to_string();
                inner.record(
                    &subject_id,
                    correlation_id,
                    StoryEventKind::TranslationReverted,
                    self.clock.as_ref(),
                );
                debug!("translation reverted");
                return Ok(TranslationOutcome::Reverted);
            }
            let request = GenerationRequest::Translation {
                text: session.text(),
                language: self.translation_language.clone(),
            };
            let subject_id = session.id.to_string();
            inner.translating = true;
            (inner.generation, subject_id, request)
        };

        let reset = ResetOnDrop::new(|| {
            let mut inner = lock(&self.inner);
            if inner.generation == generation {
                inner.translating = false;
            }
        });

        info!(%correlation_id, language = %self.translation_language, "requesting translation");
        let translated = request_text(self.service.as_ref(), &request).await;

        let mut inner = lock(&self.inner);
        reset.disarm();
        if inner.generation != generation {
            debug!("translation arrived after the story changed; discarding");
            return Ok(TranslationOutcome::Superseded);
        }
        inner.translating = false;

        match translated {
            Ok(text) => {
                if let Some(session) = inner.current.as_mut() {
                    session.apply_translation(&text);
                }
                inner.record(
                    &subject_id,
                    correlation_id,
                    StoryEventKind::StoryTranslated(StoryTranslated {
                        language: self.translation_language.clone(),
                    }),
                    self.clock.as_ref(),
                );
                info!("translation shown");
                Ok(TranslationOutcome::Translated)
            }
            Err(error) => {
                inner.record(
                    &subject_id,
                    correlation_id,
                    StoryEventKind::TranslationFailed(StoryOperationFailed {
                        reason: error.to_string(),
                    }),
                    self.clock.as_ref(),
                );
                warn!(%error, "translation failed");
                Err(error)
            }
        }
    }

    /// Asks for a continuation of the open story and opens it in place of
    /// the current one.
    ///
    /// The request carries the title and only the trailing excerpt of the
    /// displayed text.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveStory` without an open story and
    /// `EngineError::OperationInFlight` while a sequel is outstanding.
    /// Service failures are returned after recording a notice; the open
    /// story is left as it was.
    #[instrument(skip(self))]
    pub async fn chain_sequel(&self) -> Result<SequelOutcome, EngineError> {
        let correlation_id = Uuid::new_v4();
        let (generation, previous, request) = {
            let mut inner = lock(&self.inner);
            if inner.sequel_loading {
                return Err(EngineError::OperationInFlight(Operation::Sequel));
            }
            let session = inner.current()?;
            let request = GenerationRequest::Sequel {
                title: session.title.clone(),
                excerpt: session.trailing_excerpt(self.sequel_excerpt_chars),
            };
            let previous = (session.id.clone(), session.title.clone(), session.category.clone());
            inner.sequel_loading = true;
            (inner.generation, previous, request)
        };
        let (previous_id, previous_title, category) = previous;

        let reset = ResetOnDrop::new(|| {
            let mut inner = lock(&self.inner);
            if inner.generation == generation {
                inner.sequel_loading = false;
            }
        });

        info!(%correlation_id, "requesting sequel");
        let written = request_text(self.service.as_ref(), &request).await;

        let mut inner = lock(&self.inner);
        reset.disarm();
        if inner.generation != generation {
            debug!("sequel arrived after the story changed; discarding");
            return Ok(SequelOutcome::Superseded);
        }
        inner.sequel_loading = false;

        let text = match written {
            Ok(text) => text,
            Err(error) => {
                inner.record(
                    previous_id.as_str(),
                    correlation_id,
                    StoryEventKind::SequelFailed(StoryOperationFailed {
                        reason: error.to_string(),
                    }),
                    self.clock.as_ref(),
                );
                warn!(%error, "sequel failed");
                return Err(error);
            }
        };

        let parsed = extract_titled_story(&text, &format!("{previous_title} Part 2"));
        let id = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            StoryId::synthesized("sequel", &mut *rng)
        };
        let sequel = StorySession::new(
            id.clone(),
            parsed.title.clone(),
            SEQUEL_AUTHOR,
            category,
            &parsed.content,
        )
        .with_styling(Styling::magic());

        inner.record(
            id.as_str(),
            correlation_id,
            StoryEventKind::SequelChained(SequelChained {
                previous_id: previous_id.to_string(),
                title: parsed.title,
                title_from_model: parsed.title_source == TitleSource::Marker,
            }),
            self.clock.as_ref(),
        );
        self.replace(&mut inner, sequel, correlation_id);
        Ok(SequelOutcome::Opened(id))
    }

    /// Toggles narration of the displayed text.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveStory` without an open story, otherwise
    /// whatever [`PlaybackController::toggle`] returns.
    pub async fn narrate(&self) -> Result<PlaybackOutcome, EngineError> {
        let (subject_id, text) = {
            let inner = lock(&self.inner);
            let session = inner.current()?;
            (session.id.to_string(), session.text())
        };
        self.playback.toggle(&subject_id, &text).await
    }

    /// Takes all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<StoryEvent> {
        std::mem::take(&mut lock(&self.inner).pending_events)
    }

    fn replace(&self, inner: &mut SessionInner, mut session: StorySession, correlation_id: Uuid) {
        self.playback.stop();
        session.discard_translation();
        inner.generation += 1;
        inner.translating = false;
        inner.sequel_loading = false;
        inner.record(
            session.id.as_str(),
            correlation_id,
            StoryEventKind::StoryOpened(StoryOpened {
                title: session.title.clone(),
                paragraph_count: session.paragraphs().len(),
            }),
            self.clock.as_ref(),
        );
        info!(story_id = %session.id, title = %session.title, "story opened");
        inner.current = Some(session);
    }
}
