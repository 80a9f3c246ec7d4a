//! Platform audio output capability.
//!
//! Hosts turn an encoded audio container into something playable: a blob
//! URL plus an `Audio` element in a browser, a sink on a native device. The
//! engine only needs to create, start, halt and release that resource.

use crate::error::EngineError;

/// Invoked once by the platform when playback reaches its natural end.
///
/// Platforms must deliver it after `create`/`start` have returned, never
/// from inside them.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// A live, platform-owned playable resource.
pub trait PlayableResource: Send {
    /// Begin playback.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::AudioOutput` if the platform refuses to play.
    fn start(&mut self) -> Result<(), EngineError>;

    /// Halt playback immediately.
    fn halt(&mut self);

    /// Release the underlying platform handle. Called exactly once.
    fn release(&mut self);
}

/// Factory for playable resources.
pub trait AudioOutput: Send + Sync {
    /// Wrap an encoded audio container in a playable resource.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::AudioOutput` if the resource cannot be created.
    fn create(
        &self,
        container: &[u8],
        on_finished: CompletionCallback,
    ) -> Result<Box<dyn PlayableResource>, EngineError>;
}
