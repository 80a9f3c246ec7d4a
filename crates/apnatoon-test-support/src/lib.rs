//! Shared test doubles and utilities for the Apna TOON story engine.

mod clock;
mod output;
mod rng;
mod service;

pub use clock::{FixedClock, fixed_now};
pub use output::RecordingAudioOutput;
pub use rng::{MockRng, SequenceRng};
pub use service::{FailingGenerativeService, ScriptedGenerativeService};
