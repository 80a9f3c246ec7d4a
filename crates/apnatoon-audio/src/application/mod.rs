//! Application layer for the Narration context.

pub mod playback;
