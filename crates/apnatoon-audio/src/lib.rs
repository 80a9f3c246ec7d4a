//! Apna TOON — Narration bounded context.
//!
//! Responsible for wrapping raw narration PCM in a playable container and for
//! owning the single live playback handle.

pub mod application;
pub mod domain;
