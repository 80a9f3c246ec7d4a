//! Apna TOON — Quiz bounded context.
//!
//! Responsible for turning model output into multiple-choice questions and
//! running a scored, timed pass over them.

pub mod application;
pub mod domain;
