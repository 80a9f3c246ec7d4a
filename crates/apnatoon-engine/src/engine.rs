//! The reader engine: one per reader, one open story at a time.

use std::sync::{Arc, PoisonError};

use apnatoon_audio::application::playback::{PlaybackController, PlaybackOutcome, PlaybackState};
use apnatoon_core::error::EngineError;
use apnatoon_core::event::DomainEvent;
use apnatoon_quiz::application::controller::{QuizController, QuizStart, QuizView};
use apnatoon_story::application::creator::{StoryCreator, StoryDraft};
use apnatoon_story::application::session_controller::{
    SequelOutcome, StorySessionController, TranslationOutcome,
};
use apnatoon_story::domain::session::{StoryId, StoryRecord, StorySession};
use tracing::info;

use crate::notice::{Notice, to_notice};
use crate::state::EngineState;

/// Front door for a reader: opening stories, narration, translation,
/// sequels, story generation and quizzes.
pub struct ReaderEngine {
    state: EngineState,
    playback: Arc<PlaybackController>,
    stories: StorySessionController,
    creator: StoryCreator,
    quiz: QuizController,
}

impl ReaderEngine {
    /// Wires every controller onto the shared state.
    #[must_use]
    pub fn new(state: EngineState) -> Self {
        let playback = Arc::new(PlaybackController::new(
            Arc::clone(&state.service),
            Arc::clone(&state.output),
            Arc::clone(&state.clock),
            &state.config,
        ));
        let stories = StorySessionController::new(
            Arc::clone(&state.service),
            Arc::clone(&playback),
            Arc::clone(&state.clock),
            Arc::clone(&state.rng),
            &state.config,
        );
        let creator = StoryCreator::new(Arc::clone(&state.service), Arc::clone(&state.clock));
        let quiz = QuizController::new(
            Arc::clone(&state.service),
            Arc::clone(&state.clock),
            &state.config,
        );
        info!(
            voice = %state.config.voice_name,
            language = %state.config.translation_language,
            "reader engine ready"
        );
        Self {
            state,
            playback,
            stories,
            creator,
            quiz,
        }
    }

    /// Opens a story, closing any quiz about the previous one.
    pub fn open(&self, session: StorySession) {
        self.quiz.close();
        self.stories.open(session);
    }

    /// Opens a story from the content repository.
    pub fn open_record(&self, record: StoryRecord) -> StoryId {
        let session = StorySession::from(record);
        let id = session.id.clone();
        self.open(session);
        id
    }

    /// Navigates away from the open story.
    pub fn close(&self) -> bool {
        self.quiz.close();
        self.stories.close()
    }

    /// A snapshot of the open story.
    #[must_use]
    pub fn current_story(&self) -> Option<StorySession> {
        self.stories.current()
    }

    /// Toggles narration of the open story.
    ///
    /// # Errors
    ///
    /// See [`StorySessionController::narrate`].
    pub async fn narrate(&self) -> Result<PlaybackOutcome, EngineError> {
        self.stories.narrate().await
    }

    /// Stops narration if any.
    pub fn stop_narration(&self) -> bool {
        self.playback.stop()
    }

    /// Current narration state.
    #[must_use]
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Toggles the translation of the open story.
    ///
    /// # Errors
    ///
    /// See [`StorySessionController::translate_toggle`].
    pub async fn translate_toggle(&self) -> Result<TranslationOutcome, EngineError> {
        self.stories.translate_toggle().await
    }

    /// Whether a translation is outstanding.
    #[must_use]
    pub fn is_translating(&self) -> bool {
        self.stories.is_translating()
    }

    /// Continues the open story and opens the sequel.
    ///
    /// # Errors
    ///
    /// See [`StorySessionController::chain_sequel`].
    pub async fn chain_sequel(&self) -> Result<SequelOutcome, EngineError> {
        let outcome = self.stories.chain_sequel().await?;
        if matches!(outcome, SequelOutcome::Opened(_)) {
            self.quiz.close();
        }
        Ok(outcome)
    }

    /// Whether a sequel is outstanding.
    #[must_use]
    pub fn is_sequel_loading(&self) -> bool {
        self.stories.is_sequel_loading()
    }

    /// Writes a story about `prompt` without opening it.
    ///
    /// # Errors
    ///
    /// See [`StoryCreator::generate`].
    pub async fn generate_story(&self, prompt: &str) -> Result<StoryDraft, EngineError> {
        self.creator.generate(prompt).await
    }

    /// Whether a story is being written.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.creator.is_generating()
    }

    /// Opens a generated draft.
    pub fn open_draft(&self, draft: StoryDraft) -> StoryId {
        let session = {
            let mut rng = self.state.rng.lock().unwrap_or_else(PoisonError::into_inner);
            draft.into_session(&mut *rng)
        };
        let id = session.id.clone();
        self.open(session);
        id
    }

    /// Builds a quiz about the displayed text of the open story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveStory` without an open story, otherwise
    /// see [`QuizController::start`].
    pub async fn start_quiz(&self) -> Result<QuizStart, EngineError> {
        let story = self.stories.current().ok_or(EngineError::NoActiveStory)?;
        self.quiz.start(story.id.as_str(), &story.text()).await
    }

    /// Answers the current quiz question. See [`QuizController::answer`].
    pub fn answer_quiz(&self, option: &str) -> Option<bool> {
        self.quiz.answer(option)
    }

    /// Dismisses the quiz.
    pub fn close_quiz(&self) -> bool {
        self.quiz.close()
    }

    /// A snapshot of the quiz for rendering.
    #[must_use]
    pub fn quiz_view(&self) -> QuizView {
        self.quiz.snapshot()
    }

    /// Takes every event recorded since the last drain, narration first,
    /// then story, then creator, then quiz.
    pub fn drain_notices(&self) -> Vec<Notice> {
        let playback = self.playback.drain_events();
        let stories = self.stories.drain_events();
        let drafts = self.creator.drain_events();
        let quiz = self.quiz.drain_events();

        playback
            .iter()
            .map(|e| to_notice(e))
            .chain(stories.iter().map(|e| to_notice(e)))
            .chain(drafts.iter().map(|e| to_notice(e)))
            .chain(quiz.iter().map(|e| to_notice(e)))
            .collect()
    }
}

impl Drop for ReaderEngine {
    fn drop(&mut self) {
        self.quiz.close();
        self.playback.stop();
    }
}
