//! Domain layer for the Story context.

pub mod events;
pub mod parser;
pub mod session;
