//! Apna TOON — Story bounded context.
//!
//! Responsible for the story currently being read: opening it, toggling its
//! translation, chaining sequels onto it, and authoring fresh stories from a
//! prompt.

pub mod application;
pub mod domain;
