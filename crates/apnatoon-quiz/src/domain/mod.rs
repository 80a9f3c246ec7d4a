//! Domain layer for the Quiz context.

pub mod events;
pub mod parser;
pub mod quiz;
