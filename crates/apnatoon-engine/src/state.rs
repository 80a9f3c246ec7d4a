//! Shared engine wiring.

use std::sync::Arc;

use apnatoon_core::clock::Clock;
use apnatoon_core::config::EngineConfig;
use apnatoon_core::output::AudioOutput;
use apnatoon_core::rng::SharedRng;
use apnatoon_core::service::GenerativeService;

/// Collaborators and configuration shared by every controller of an engine.
#[derive(Clone)]
pub struct EngineState {
    /// Tunables.
    pub config: EngineConfig,
    /// Remote text and speech service.
    pub service: Arc<dyn GenerativeService>,
    /// Platform audio output.
    pub output: Arc<dyn AudioOutput>,
    /// Clock for event timestamps.
    pub clock: Arc<dyn Clock>,
    /// Randomness for synthesized story ids.
    pub rng: SharedRng,
}

impl EngineState {
    /// Create new engine state.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        service: Arc<dyn GenerativeService>,
        output: Arc<dyn AudioOutput>,
        clock: Arc<dyn Clock>,
        rng: SharedRng,
    ) -> Self {
        Self {
            config,
            service,
            output,
            clock,
            rng,
        }
    }
}
