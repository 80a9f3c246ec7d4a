//! Quiz session controller.
//!
//! State machine: `Closed → Loading → (Active | Errored) → Closed`. Answer
//! feedback stays up for a fixed delay before a spawned task advances the
//! quiz. Closing aborts that task; an epoch check covers a task that was
//! already past its sleep.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use apnatoon_core::clock::Clock;
use apnatoon_core::config::EngineConfig;
use apnatoon_core::error::{EngineError, Operation};
use apnatoon_core::event::EventMetadata;
use apnatoon_core::guard::ResetOnDrop;
use apnatoon_core::service::{GenerationRequest, GenerativeService, request_text};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::events::{
    AnswerRecorded, QuestionAdvanced, QuizCompleted, QuizEvent, QuizEventKind, QuizFailed,
    QuizLoaded,
};
use crate::domain::parser::parse_quiz;
use crate::domain::quiz::{Advance, QuestionStage, QuizResult, QuizSession};

/// Coarse quiz status for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuizStatus {
    /// No quiz is open.
    Closed,
    /// Questions have been requested.
    Loading,
    /// Waiting for an answer.
    Unanswered,
    /// Showing feedback for an answer.
    Answered,
    /// Showing the final score.
    Result,
    /// No quiz could be built for the story.
    Errored,
}

/// Read model of the quiz for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    /// Coarse status.
    pub status: QuizStatus,
    /// Current question text.
    pub question: Option<String>,
    /// Current options, in display order.
    pub options: Vec<String>,
    /// Zero-based index of the current question.
    pub index: usize,
    /// Number of questions.
    pub total: usize,
    /// Correct answers so far.
    pub score: usize,
    /// Answer picked for the current question.
    pub selected_answer: Option<String>,
    /// Final score, once done.
    pub result: Option<QuizResult>,
    /// Why the quiz could not be built.
    pub error: Option<String>,
}

impl QuizView {
    fn empty(status: QuizStatus) -> Self {
        Self {
            status,
            question: None,
            options: Vec::new(),
            index: 0,
            total: 0,
            score: 0,
            selected_answer: None,
            result: None,
            error: None,
        }
    }
}

/// How a `start` call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStart {
    /// The quiz is active with this many questions.
    Ready(usize),
    /// The quiz was closed or restarted while loading.
    Superseded,
}

enum QuizPhase {
    Closed,
    Loading,
    Active(QuizSession),
    Errored(String),
}

struct QuizInner {
    phase: QuizPhase,
    /// Bumped on every start and close; stale fetches and timers compare it.
    epoch: u64,
    subject_id: String,
    correlation_id: Uuid,
    advance_task: Option<JoinHandle<()>>,
    pending_events: Vec<QuizEvent>,
}

impl QuizInner {
    fn record(&mut self, kind: QuizEventKind, clock: &dyn Clock) {
        let metadata = EventMetadata::new(
            kind.event_type(),
            self.subject_id.clone(),
            self.correlation_id,
            clock,
        );
        self.pending_events.push(QuizEvent { metadata, kind });
    }

    fn cancel_advance(&mut self) {
        if let Some(task) = self.advance_task.take() {
            task.abort();
        }
    }
}

fn lock(inner: &Mutex<QuizInner>) -> MutexGuard<'_, QuizInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one quiz at a time over story text.
pub struct QuizController {
    inner: Arc<Mutex<QuizInner>>,
    service: Arc<dyn GenerativeService>,
    clock: Arc<dyn Clock>,
    question_count: usize,
    feedback_delay: Duration,
}

impl QuizController {
    /// Creates a closed controller.
    #[must_use]
    pub fn new(
        service: Arc<dyn GenerativeService>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QuizInner {
                phase: QuizPhase::Closed,
                epoch: 0,
                subject_id: String::new(),
                correlation_id: Uuid::nil(),
                advance_task: None,
                pending_events: Vec::new(),
            })),
            service,
            clock,
            question_count: config.quiz_question_count,
            feedback_delay: config.quiz_feedback_delay(),
        }
    }

    /// Whether questions are being fetched.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(lock(&self.inner).phase, QuizPhase::Loading)
    }

    /// Discards any open quiz and builds a new one about `text`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OperationInFlight` while another quiz is
    /// loading. Service and parse failures leave the quiz in its error
    /// state and are returned; parse failures as `EngineError::MalformedQuiz`.
    #[instrument(skip(self, text))]
    pub async fn start(&self, subject_id: &str, text: &str) -> Result<QuizStart, EngineError> {
        let epoch = {
            let mut inner = lock(&self.inner);
            if matches!(inner.phase, QuizPhase::Loading) {
                return Err(EngineError::OperationInFlight(Operation::Quiz));
            }
            inner.cancel_advance();
            inner.epoch += 1;
            inner.phase = QuizPhase::Loading;
            inner.subject_id = subject_id.to_owned();
            inner.correlation_id = Uuid::new_v4();
            info!(correlation_id = %inner.correlation_id, "requesting quiz");
            inner.epoch
        };

        let reset = ResetOnDrop::new(|| {
            let mut inner = lock(&self.inner);
            if inner.epoch == epoch && matches!(inner.phase, QuizPhase::Loading) {
                inner.phase = QuizPhase::Closed;
            }
        });

        let request = GenerationRequest::Quiz {
            text: text.to_owned(),
            question_count: self.question_count,
        };
        let built = request_text(self.service.as_ref(), &request)
            .await
            .and_then(|raw| {
                let questions = parse_quiz(&raw)?;
                Ok(QuizSession::new(questions)?)
            });

        let mut inner = lock(&self.inner);
        reset.disarm();
        if inner.epoch != epoch {
            debug!("quiz arrived after close; discarding");
            return Ok(QuizStart::Superseded);
        }

        match built {
            Ok(session) => {
                let question_count = session.total();
                inner.phase = QuizPhase::Active(session);
                inner.record(
                    QuizEventKind::QuizLoaded(QuizLoaded { question_count }),
                    self.clock.as_ref(),
                );
                info!(question_count, "quiz ready");
                Ok(QuizStart::Ready(question_count))
            }
            Err(error) => {
                let reason = error.to_string();
                inner.phase = QuizPhase::Errored(reason.clone());
                inner.record(
                    QuizEventKind::QuizFailed(QuizFailed { reason }),
                    self.clock.as_ref(),
                );
                warn!(%error, "could not build quiz");
                Err(error)
            }
        }
    }

    /// Records `option` for the current question and schedules the advance.
    ///
    /// Returns whether the answer was correct, or `None` when no question is
    /// waiting for an answer. Outside a Tokio runtime the advance cannot be
    /// scheduled, so the answer is not recorded and `None` is returned.
    pub fn answer(&self, option: &str) -> Option<bool> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime to schedule the quiz advance; answer ignored");
            return None;
        };
        let mut inner = lock(&self.inner);
        let QuizPhase::Active(session) = &mut inner.phase else {
            return None;
        };
        let question_index = session.current_index();
        let correct = session.answer(option)?;
        let epoch = inner.epoch;
        inner.record(
            QuizEventKind::AnswerRecorded(AnswerRecorded {
                question_index,
                correct,
            }),
            self.clock.as_ref(),
        );
        debug!(question_index, correct, "answer recorded");

        let task = runtime.spawn(advance_after(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.clock),
            self.feedback_delay,
            epoch,
        ));
        inner.advance_task = Some(task);
        Some(correct)
    }

    /// Dismisses the quiz from any state. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        let mut inner = lock(&self.inner);
        inner.cancel_advance();
        inner.epoch += 1;
        if matches!(inner.phase, QuizPhase::Closed) {
            return false;
        }
        inner.phase = QuizPhase::Closed;
        inner.record(QuizEventKind::QuizClosed, self.clock.as_ref());
        info!("quiz closed");
        true
    }

    /// A snapshot of the quiz for rendering.
    #[must_use]
    pub fn snapshot(&self) -> QuizView {
        let inner = lock(&self.inner);
        match &inner.phase {
            QuizPhase::Closed => QuizView::empty(QuizStatus::Closed),
            QuizPhase::Loading => QuizView::empty(QuizStatus::Loading),
            QuizPhase::Errored(reason) => QuizView {
                error: Some(reason.clone()),
                ..QuizView::empty(QuizStatus::Errored)
            },
            QuizPhase::Active(session) => {
                let question = session.current_question();
                QuizView {
                    status: match session.stage() {
                        QuestionStage::Unanswered => QuizStatus::Unanswered,
                        QuestionStage::Answered => QuizStatus::Answered,
                        QuestionStage::Result => QuizStatus::Result,
                    },
                    question: Some(question.question.clone()),
                    options: question.options.clone(),
                    index: session.current_index(),
                    total: session.total(),
                    score: session.score(),
                    selected_answer: session.selected_answer().map(str::to_owned),
                    result: session.result(),
                    error: None,
                }
            }
        }
    }

    /// A copy of the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<QuizSession> {
        match &lock(&self.inner).phase {
            QuizPhase::Active(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Takes all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<QuizEvent> {
        std::mem::take(&mut lock(&self.inner).pending_events)
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        lock(&self.inner).cancel_advance();
    }
}

async fn advance_after(
    inner: Weak<Mutex<QuizInner>>,
    clock: Arc<dyn Clock>,
    delay: Duration,
    epoch: u64,
) {
    tokio::time::sleep(delay).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = lock(&inner);
    if inner.epoch != epoch {
        return;
    }
    inner.advance_task = None;
    let QuizPhase::Active(session) = &mut inner.phase else {
        return;
    };
    let kind = match session.advance() {
        Some(Advance::NextQuestion(question_index)) => {
            QuizEventKind::QuestionAdvanced(QuestionAdvanced { question_index })
        }
        Some(Advance::Finished(result)) => {
            info!(score = result.score, total = result.total, "quiz completed");
            QuizEventKind::QuizCompleted(QuizCompleted {
                score: result.score,
                total: result.total,
            })
        }
        None => return,
    };
    inner.record(kind, clock.as_ref());
}
