//! The single live narration handle.

use apnatoon_core::error::EngineError;
use apnatoon_core::output::{AudioOutput, CompletionCallback, PlayableResource};

/// Owns an encoded narration buffer and the platform resource playing it.
///
/// Dropping the handle halts playback and releases the platform resource, so
/// discarding a handle can never leak a blob URL or device sink.
pub struct AudioHandle {
    container: Vec<u8>,
    resource: Box<dyn PlayableResource>,
}

impl AudioHandle {
    /// Creates a platform resource for `container` and starts it.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the resource cannot be created or
    /// started. A resource that was created but failed to start is released
    /// before returning.
    pub fn start(
        output: &dyn AudioOutput,
        container: Vec<u8>,
        on_finished: CompletionCallback,
    ) -> Result<Self, EngineError> {
        let resource = output.create(&container, on_finished)?;
        let mut handle = Self {
            container,
            resource,
        };
        handle.resource.start()?;
        Ok(handle)
    }

    /// The encoded container being played.
    #[must_use]
    pub fn container(&self) -> &[u8] {
        &self.container
    }
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioHandle")
            .field("container_bytes", &self.container.len())
            .finish_non_exhaustive()
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.resource.halt();
        self.resource.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apnatoon_test_support::RecordingAudioOutput;

    #[test]
    fn test_start_plays_container_and_drop_releases_it() {
        // Arrange
        let output = RecordingAudioOutput::new();

        // Act
        let handle = AudioHandle::start(&output, vec![1, 2, 3], Box::new(|| {})).unwrap();

        // Assert
        assert!(output.was_started(0));
        assert_eq!(output.container(0), vec![1, 2, 3]);
        assert_eq!(handle.container(), &[1, 2, 3]);
        assert_eq!(output.live_count(), 1);

        drop(handle);
        assert!(output.was_halted(0));
        assert!(output.was_released(0));
        assert_eq!(output.live_count(), 0);
    }

    #[test]
    fn test_failed_create_leaves_nothing_live() {
        let output = RecordingAudioOutput::new();
        output.fail_next_create();

        let result = AudioHandle::start(&output, vec![0; 4], Box::new(|| {}));

        assert!(matches!(result, Err(EngineError::AudioOutput(_))));
        assert_eq!(output.created_count(), 0);
        assert_eq!(output.live_count(), 0);
    }

    #[test]
    fn test_failed_start_halts_and_releases_the_resource() {
        // Arrange
        let output = RecordingAudioOutput::new();
        output.fail_next_start();

        // Act
        let result = AudioHandle::start(&output, vec![0; 4], Box::new(|| {}));

        // Assert
        assert!(matches!(result, Err(EngineError::AudioOutput(_))));
        assert_eq!(output.created_count(), 1);
        assert!(!output.was_started(0));
        assert!(output.was_halted(0));
        assert!(output.was_released(0));
        assert_eq!(output.live_count(), 0);
    }
}
