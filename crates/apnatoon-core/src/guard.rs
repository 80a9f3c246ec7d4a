//! Drop guard for in-flight operation flags.
//!
//! A controller raises a flag before awaiting the generative service and
//! clears it once the response is handled. If the caller drops the future
//! at the await point, the guard runs the reset instead.

/// Runs a reset closure on drop unless [`disarm`](Self::disarm)ed.
#[must_use = "the reset runs as soon as the guard is dropped"]
pub struct ResetOnDrop<F: FnOnce()> {
    reset: Option<F>,
}

impl<F: FnOnce()> ResetOnDrop<F> {
    /// Arms `reset`.
    pub fn new(reset: F) -> Self {
        Self { reset: Some(reset) }
    }

    /// Skips the reset; the operation settled its own state.
    pub fn disarm(mut self) {
        self.reset = None;
    }
}

impl<F: FnOnce()> Drop for ResetOnDrop<F> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_reset_runs_on_drop() {
        let reset = Cell::new(false);

        drop(ResetOnDrop::new(|| reset.set(true)));

        assert!(reset.get());
    }

    #[test]
    fn test_disarmed_guard_does_not_reset() {
        let reset = Cell::new(false);

        ResetOnDrop::new(|| reset.set(true)).disarm();

        assert!(!reset.get());
    }
}
