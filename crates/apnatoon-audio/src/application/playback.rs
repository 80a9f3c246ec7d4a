//! Narration playback controller.
//!
//! State machine: `Idle → Loading → Playing → Idle`, with `Loading → Idle` on
//! failure. At most one [`AudioHandle`] exists at any instant; starting always
//! tears down whatever came before.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use apnatoon_core::clock::Clock;
use apnatoon_core::config::EngineConfig;
use apnatoon_core::error::EngineError;
use apnatoon_core::event::EventMetadata;
use apnatoon_core::guard::ResetOnDrop;
use apnatoon_core::output::{AudioOutput, CompletionCallback};
use apnatoon_core::service::{GenerativeService, SpeechPayload, SpeechRequest};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::events::{NarrationFailed, NarrationStarted, PlaybackEvent, PlaybackEventKind};
use crate::domain::handle::AudioHandle;
use crate::domain::wav::pcm_to_wav;

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loading or playing.
    Idle,
    /// Narration audio has been requested.
    Loading,
    /// A handle is live and playing.
    Playing,
}

/// How a `toggle` call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Audio is now playing.
    Started,
    /// Prior loading or playback was torn down; nothing is playing.
    Stopped,
    /// The audio arrived after a stop and was discarded.
    Superseded,
}

struct PlaybackInner {
    state: PlaybackState,
    /// Bumped on every start and teardown; late completions compare against it.
    epoch: u64,
    subject_id: String,
    correlation_id: Uuid,
    handle: Option<AudioHandle>,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackInner {
    fn record(&mut self, kind: PlaybackEventKind, clock: &dyn Clock) {
        let metadata = EventMetadata::new(
            kind.event_type(),
            self.subject_id.clone(),
            self.correlation_id,
            clock,
        );
        self.pending_events.push(PlaybackEvent { metadata, kind });
    }
}

fn lock(inner: &Mutex<PlaybackInner>) -> MutexGuard<'_, PlaybackInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the one narration handle and drives it through the generative
/// service and the platform audio output.
pub struct PlaybackController {
    inner: Arc<Mutex<PlaybackInner>>,
    service: Arc<dyn GenerativeService>,
    output: Arc<dyn AudioOutput>,
    clock: Arc<dyn Clock>,
    sample_rate: u32,
    voice: String,
}

impl PlaybackController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(
        service: Arc<dyn GenerativeService>,
        output: Arc<dyn AudioOutput>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlaybackInner {
                state: PlaybackState::Idle,
                epoch: 0,
                subject_id: String::new(),
                correlation_id: Uuid::nil(),
                handle: None,
                pending_events: Vec::new(),
            })),
            service,
            output,
            clock,
            sample_rate: config.sample_rate,
            voice: config.voice_name.clone(),
        }
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        lock(&self.inner).state
    }

    /// Whether a platform resource is currently held.
    #[must_use]
    pub fn has_live_handle(&self) -> bool {
        lock(&self.inner).handle.is_some()
    }

    /// Starts narrating `text`, or stops if narration is already loading or
    /// playing. Same as [`toggle`](Self::toggle); calling it while playing
    /// never restarts.
    ///
    /// # Errors
    ///
    /// See [`toggle`](Self::toggle).
    pub async fn play(&self, subject_id: &str, text: &str) -> Result<PlaybackOutcome, EngineError> {
        self.toggle(subject_id, text).await
    }

    /// Starts narrating `text` when idle; otherwise tears down the current
    /// handle and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for blank text when idle. Returns
    /// `EngineError::NarrationFailed` if the audio could not be fetched,
    /// decoded or played; the controller is back in `Idle` with no handle.
    #[instrument(skip(self, text))]
    pub async fn toggle(
        &self,
        subject_id: &str,
        text: &str,
    ) -> Result<PlaybackOutcome, EngineError> {
        let epoch = {
            let mut inner = lock(&self.inner);
            if inner.state != PlaybackState::Idle {
                self.teardown(&mut inner);
                return Ok(PlaybackOutcome::Stopped);
            }
            if text.trim().is_empty() {
                return Err(EngineError::Validation("nothing to narrate".to_owned()));
            }
            inner.epoch += 1;
            inner.state = PlaybackState::Loading;
            inner.subject_id = subject_id.to_owned();
            inner.correlation_id = Uuid::new_v4();
            info!(correlation_id = %inner.correlation_id, "requesting narration audio");
            inner.epoch
        };

        let request = SpeechRequest {
            text: text.to_owned(),
            voice: self.voice.clone(),
        };
        let reset = ResetOnDrop::new(|| {
            let mut inner = lock(&self.inner);
            if inner.epoch == epoch && inner.state == PlaybackState::Loading {
                inner.state = PlaybackState::Idle;
            }
        });
        let fetched = self.service.synthesize_speech(&request).await;

        let mut inner = lock(&self.inner);
        reset.disarm();
        if inner.epoch != epoch {
            debug!("narration audio arrived after stop; discarding");
            return Ok(PlaybackOutcome::Superseded);
        }

        let started = fetched.and_then(|payload| {
            let (container, sample_rate) = self.encode(&payload)?;
            let handle = AudioHandle::start(self.output.as_ref(), container, self.completion(epoch))?;
            Ok((handle, sample_rate))
        });

        match started {
            Ok((handle, sample_rate)) => {
                let container_bytes = handle.container().len();
                inner.handle = Some(handle);
                inner.state = PlaybackState::Playing;
                inner.record(
                    PlaybackEventKind::NarrationStarted(NarrationStarted {
                        container_bytes,
                        sample_rate,
                    }),
                    self.clock.as_ref(),
                );
                info!(container_bytes, "narration playing");
                Ok(PlaybackOutcome::Started)
            }
            Err(error) => {
                let reason = match error {
                    EngineError::NarrationFailed(reason) => reason,
                    other => other.to_string(),
                };
                inner.state = PlaybackState::Idle;
                inner.record(
                    PlaybackEventKind::NarrationFailed(NarrationFailed {
                        reason: reason.clone(),
                    }),
                    self.clock.as_ref(),
                );
                warn!(%reason, "narration failed");
                Err(EngineError::NarrationFailed(reason))
            }
        }
    }

    /// Halts and releases any live handle and returns to `Idle`. Safe in any
    /// state; a pending audio request is discarded when it lands.
    ///
    /// Returns `true` if something was loading or playing.
    pub fn stop(&self) -> bool {
        let mut inner = lock(&self.inner);
        self.teardown(&mut inner)
    }

    /// Takes all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut lock(&self.inner).pending_events)
    }

    fn teardown(&self, inner: &mut PlaybackInner) -> bool {
        let was_active = inner.state != PlaybackState::Idle;
        inner.epoch += 1;
        inner.handle = None;
        inner.state = PlaybackState::Idle;
        if was_active {
            inner.record(PlaybackEventKind::NarrationStopped, self.clock.as_ref());
            info!("narration stopped");
        }
        was_active
    }

    fn encode(&self, payload: &SpeechPayload) -> Result<(Vec<u8>, u32), EngineError> {
        let encoded = payload.audio_base64.trim();
        if encoded.is_empty() {
            return Err(EngineError::EmptyResponse);
        }
        let pcm = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| EngineError::NarrationFailed(format!("audio payload is not base64: {e}")))?;
        let sample_rate = payload.sample_rate.unwrap_or(self.sample_rate);
        Ok((pcm_to_wav(&pcm, sample_rate), sample_rate))
    }

    fn completion(&self, epoch: u64) -> CompletionCallback {
        let inner = Arc::downgrade(&self.inner);
        let clock = Arc::clone(&self.clock);
        Box::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut inner = lock(&inner);
            if inner.epoch != epoch || inner.state != PlaybackState::Playing {
                return;
            }
            inner.handle = None;
            inner.state = PlaybackState::Idle;
            inner.record(PlaybackEventKind::NarrationFinished, clock.as_ref());
            debug!("narration finished");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use apnatoon_core::config::EngineConfig;
    use apnatoon_core::error::EngineError;
    use apnatoon_core::event::DomainEvent;
    use apnatoon_test_support::{
        FailingGenerativeService, FixedClock, RecordingAudioOutput, ScriptedGenerativeService,
        fixed_now,
    };

    use super::{PlaybackController, PlaybackOutcome, PlaybackState};
    use crate::domain::events::{
        NARRATION_FAILED_EVENT_TYPE, NARRATION_FINISHED_EVENT_TYPE, NARRATION_STARTED_EVENT_TYPE,
        NARRATION_STOPPED_EVENT_TYPE,
    };
    use crate::domain::wav::HEADER_LEN;

    // Four PCM bytes: two samples.
    const PCM_B64: &str = "AAEAAg==";

    fn controller(
        service: ScriptedGenerativeService,
    ) -> (PlaybackController, Arc<ScriptedGenerativeService>, RecordingAudioOutput) {
        let service = Arc::new(service);
        let output = RecordingAudioOutput::new();
        let controller = PlaybackController::new(
            service.clone(),
            Arc::new(output.clone()),
            Arc::new(FixedClock(fixed_now())),
            &EngineConfig::default(),
        );
        (controller, service, output)
    }

    fn event_types(controller: &PlaybackController) -> Vec<&'static str> {
        controller
            .drain_events()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }

    #[tokio::test]
    async fn test_toggle_from_idle_starts_playback() {
        // Arrange
        let (controller, service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, None));

        // Act
        let outcome = controller.toggle("story-1", "Once upon a time").await;

        // Assert
        assert_eq!(outcome.unwrap(), PlaybackOutcome::Started);
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert!(controller.has_live_handle());
        assert_eq!(output.live_count(), 1);
        assert!(output.was_started(0));

        let container = output.container(0);
        assert_eq!(container.len(), HEADER_LEN + 4);
        assert_eq!(&container[HEADER_LEN..], &[0, 1, 0, 2]);

        let requests = service.speech_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "Once upon a time");
        assert_eq!(requests[0].voice, "Kore");

        let events = controller.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), NARRATION_STARTED_EVENT_TYPE);
        assert_eq!(events[0].metadata.subject_id, "story-1");
        assert_eq!(events[0].metadata.occurred_at, fixed_now());
    }

    #[tokio::test]
    async fn test_reported_sample_rate_is_written_into_container() {
        let (controller, _service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, Some(16_000)));

        controller.toggle("story-1", "Hello").await.unwrap();

        let container = output.container(0);
        assert_eq!(&container[24..28], &16_000_u32.to_le_bytes());
    }

    #[tokio::test]
    async fn test_second_play_while_playing_stops_instead_of_restarting() {
        // Arrange
        let (controller, service, output) = controller(
            ScriptedGenerativeService::new()
                .with_speech(PCM_B64, None)
                .with_speech(PCM_B64, None),
        );

        // Act
        controller.play("story-1", "Hello").await.unwrap();
        let second = controller.play("story-1", "Hello").await.unwrap();

        // Assert
        assert_eq!(second, PlaybackOutcome::Stopped);
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!controller.has_live_handle());
        assert_eq!(output.created_count(), 1);
        assert_eq!(output.live_count(), 0);
        assert!(output.was_halted(0));
        assert_eq!(service.speech_requests().len(), 1);
        assert_eq!(
            event_types(&controller),
            vec![NARRATION_STARTED_EVENT_TYPE, NARRATION_STOPPED_EVENT_TYPE]
        );
    }

    #[tokio::test]
    async fn test_blank_text_while_playing_still_stops() {
        // Arrange
        let (controller, _service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, None));
        controller.toggle("story-1", "Hello").await.unwrap();

        // Act
        let outcome = controller.toggle("story-1", "   ").await;

        // Assert
        assert_eq!(outcome.unwrap(), PlaybackOutcome::Stopped);
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(output.live_count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_load_returns_to_idle() {
        let (controller, service, output) =
            controller(ScriptedGenerativeService::gated().with_speech(PCM_B64, None));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), controller.toggle("story-1", "Hello"))
                .await;
        let state_after_drop = controller.state();
        service.release(1);
        let retried = controller.toggle("story-1", "Hello").await;

        assert!(abandoned.is_err());
        assert_eq!(state_after_drop, PlaybackState::Idle);
        assert_eq!(retried.unwrap(), PlaybackOutcome::Started);
        assert_eq!(output.live_count(), 1);
    }

    #[tokio::test]
    async fn test_resource_that_fails_to_start_is_released() {
        let (controller, _service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, None));
        output.fail_next_start();

        let result = controller.toggle("story-1", "Hello").await;

        assert!(matches!(result, Err(EngineError::NarrationFailed(_))));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!controller.has_live_handle());
        assert_eq!(output.created_count(), 1);
        assert_eq!(output.live_count(), 0);
    }

    #[tokio::test]
    async fn test_natural_end_returns_to_idle_and_releases() {
        let (controller, _service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, None));
        controller.toggle("story-1", "Hello").await.unwrap();

        assert!(output.finish(0));

        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(output.was_released(0));
        assert_eq!(
            event_types(&controller),
            vec![NARRATION_STARTED_EVENT_TYPE, NARRATION_FINISHED_EVENT_TYPE]
        );
    }

    #[tokio::test]
    async fn test_completion_after_stop_is_ignored() {
        let (controller, _service, output) = controller(
            ScriptedGenerativeService::new()
                .with_speech(PCM_B64, None)
                .with_speech(PCM_B64, None),
        );
        controller.toggle("story-1", "Hello").await.unwrap();
        controller.stop();
        controller.toggle("story-1", "Hello").await.unwrap();

        // The first handle's late "ended" must not stop the second.
        output.finish(0);

        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(output.live_count(), 1);
        assert!(!output.was_released(1));
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_a_no_op() {
        let (controller, _service, _output) = controller(ScriptedGenerativeService::new());

        assert!(!controller.stop());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_reports_narration_failed() {
        // Arrange
        let output = RecordingAudioOutput::new();
        let controller = PlaybackController::new(
            Arc::new(FailingGenerativeService),
            Arc::new(output.clone()),
            Arc::new(FixedClock(fixed_now())),
            &EngineConfig::default(),
        );

        // Act
        let result = controller.toggle("story-1", "Hello").await;

        // Assert
        assert!(matches!(result, Err(EngineError::NarrationFailed(_))));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(output.created_count(), 0);
        assert_eq!(event_types(&controller), vec![NARRATION_FAILED_EVENT_TYPE]);
    }

    #[tokio::test]
    async fn test_empty_and_garbled_audio_fail_without_a_handle() {
        let (controller, _service, output) = controller(
            ScriptedGenerativeService::new()
                .with_speech("", None)
                .with_speech("not base64!!", None),
        );

        let empty = controller.toggle("story-1", "Hello").await;
        let garbled = controller.toggle("story-1", "Hello").await;

        assert!(matches!(empty, Err(EngineError::NarrationFailed(_))));
        assert!(matches!(garbled, Err(EngineError::NarrationFailed(_))));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(output.created_count(), 0);
    }

    #[tokio::test]
    async fn test_output_failure_leaves_no_dangling_handle() {
        let (controller, _service, output) =
            controller(ScriptedGenerativeService::new().with_speech(PCM_B64, None));
        output.fail_next_create();

        let result = controller.toggle("story-1", "Hello").await;

        assert!(matches!(result, Err(EngineError::NarrationFailed(_))));
        assert!(!controller.has_live_handle());
        assert_eq!(output.live_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_before_any_request() {
        let (controller, service, _output) = controller(ScriptedGenerativeService::new());

        let result = controller.toggle("story-1", "   ").await;

        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert!(service.speech_requests().is_empty());
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn test_stop_while_loading_discards_late_audio() {
        // Arrange
        let (controller, service, output) =
            controller(ScriptedGenerativeService::gated().with_speech(PCM_B64, None));

        // Act
        let (outcome, ()) = tokio::join!(controller.toggle("story-1", "Hello"), async {
            assert_eq!(controller.state(), PlaybackState::Loading);
            assert!(controller.stop());
            service.release(1);
        });

        // Assert
        assert_eq!(outcome.unwrap(), PlaybackOutcome::Superseded);
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(output.created_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_while_loading_tears_down_instead_of_queueing() {
        let (controller, service, output) =
            controller(ScriptedGenerativeService::gated().with_speech(PCM_B64, None));

        let (first, second) = tokio::join!(controller.toggle("story-1", "Hello"), async {
            let outcome = controller.toggle("story-1", "Hello").await;
            service.release(1);
            outcome
        });

        assert_eq!(second.unwrap(), PlaybackOutcome::Stopped);
        assert_eq!(first.unwrap(), PlaybackOutcome::Superseded);
        assert_eq!(output.created_count(), 0);
        assert_eq!(service.speech_requests().len(), 1);
    }
}
