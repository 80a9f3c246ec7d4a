//! Test audio output — records every playable resource it hands out.

use std::sync::{Arc, Mutex};

use apnatoon_core::error::EngineError;
use apnatoon_core::output::{AudioOutput, CompletionCallback, PlayableResource};

#[derive(Default)]
struct ResourceRecord {
    container: Vec<u8>,
    started: bool,
    halted: bool,
    released: bool,
    refuses_start: bool,
    on_finished: Option<CompletionCallback>,
}

#[derive(Default)]
struct OutputLog {
    resources: Vec<ResourceRecord>,
    fail_next_create: bool,
    fail_next_start: bool,
}

/// An audio output that records resource lifecycles instead of playing.
///
/// Tests finish playback by hand with [`finish`](Self::finish), standing in
/// for the platform's "ended" notification.
#[derive(Clone, Default)]
pub struct RecordingAudioOutput {
    log: Arc<Mutex<OutputLog>>,
}

impl std::fmt::Debug for RecordingAudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingAudioOutput")
            .field("created", &self.created_count())
            .field("live", &self.live_count())
            .finish()
    }
}

impl RecordingAudioOutput {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` call fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_next_create(&self) {
        self.log.lock().unwrap().fail_next_create = true;
    }

    /// Make the next created resource refuse to start.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_next_start(&self) {
        self.log.lock().unwrap().fail_next_start = true;
    }

    /// Number of resources ever created.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created_count(&self) -> usize {
        self.log.lock().unwrap().resources.len()
    }

    /// Number of created resources not yet released.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn live_count(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .resources
            .iter()
            .filter(|r| !r.released)
            .count()
    }

    /// Whether resource `index` was started.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the mutex is poisoned.
    pub fn was_started(&self, index: usize) -> bool {
        self.log.lock().unwrap().resources[index].started
    }

    /// Whether resource `index` was halted before release.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the mutex is poisoned.
    pub fn was_halted(&self, index: usize) -> bool {
        self.log.lock().unwrap().resources[index].halted
    }

    /// Whether resource `index` was released.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the mutex is poisoned.
    pub fn was_released(&self, index: usize) -> bool {
        self.log.lock().unwrap().resources[index].released
    }

    /// The container bytes handed to resource `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the mutex is poisoned.
    pub fn container(&self, index: usize) -> Vec<u8> {
        self.log.lock().unwrap().resources[index].container.clone()
    }

    /// Deliver the natural-end notification for resource `index`.
    ///
    /// Returns `false` if it was already delivered.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the mutex is poisoned.
    pub fn finish(&self, index: usize) -> bool {
        let callback = self.log.lock().unwrap().resources[index].on_finished.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl AudioOutput for RecordingAudioOutput {
    fn create(
        &self,
        container: &[u8],
        on_finished: CompletionCallback,
    ) -> Result<Box<dyn PlayableResource>, EngineError> {
        let mut log = self.log.lock().unwrap();
        if std::mem::take(&mut log.fail_next_create) {
            return Err(EngineError::AudioOutput("device unavailable".into()));
        }
        let refuses_start = std::mem::take(&mut log.fail_next_start);
        log.resources.push(ResourceRecord {
            container: container.to_vec(),
            refuses_start,
            on_finished: Some(on_finished),
            ..ResourceRecord::default()
        });
        Ok(Box::new(RecordedResource {
            index: log.resources.len() - 1,
            log: Arc::clone(&self.log),
        }))
    }
}

struct RecordedResource {
    index: usize,
    log: Arc<Mutex<OutputLog>>,
}

impl PlayableResource for RecordedResource {
    fn start(&mut self) -> Result<(), EngineError> {
        let mut log = self.log.lock().unwrap();
        let record = &mut log.resources[self.index];
        if record.refuses_start {
            return Err(EngineError::AudioOutput("playback refused".into()));
        }
        record.started = true;
        Ok(())
    }

    fn halt(&mut self) {
        self.log.lock().unwrap().resources[self.index].halted = true;
    }

    fn release(&mut self) {
        let mut log = self.log.lock().unwrap();
        let record = &mut log.resources[self.index];
        assert!(!record.released, "resource {} released twice", self.index);
        record.released = true;
    }
}
