//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests, a seeded or scripted
//! implementation is injected so synthesized story ids are repeatable.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// An RNG shared between the controllers of one engine.
pub type SharedRng = Arc<Mutex<dyn DeterministicRng>>;

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates an RNG seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.random()
    }
}

/// Builds a UUID from four RNG-produced `u32` words.
pub fn next_uuid(rng: &mut dyn DeterministicRng) -> Uuid {
    let hi = (u64::from(rng.next_u32_range(0, u32::MAX)) << 32)
        | u64::from(rng.next_u32_range(0, u32::MAX));
    let lo = (u64::from(rng.next_u32_range(0, u32::MAX)) << 32)
        | u64::from(rng.next_u32_range(0, u32::MAX));
    Uuid::from_u64_pair(hi, lo)
}
