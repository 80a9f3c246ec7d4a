//! Apna TOON Core — shared engine abstractions.
//!
//! This crate defines the traits and types that every bounded context of the
//! story engine depends on: time, randomness, errors, events, the generative
//! service contract, and the platform audio capability. It contains no
//! infrastructure code.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod guard;
pub mod output;
pub mod rng;
pub mod service;
