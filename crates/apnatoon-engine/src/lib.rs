//! Apna TOON — reader-facing engine.
//!
//! Wires the narration, story and quiz contexts into one [`ReaderEngine`]
//! per reader, and hosts the PCM-to-WAV conversion used by the
//! `apnatoon-pcm2wav` tool.
//!
//! [`ReaderEngine`]: engine::ReaderEngine

pub mod engine;
pub mod error;
pub mod notice;
pub mod pcm2wav;
pub mod state;
