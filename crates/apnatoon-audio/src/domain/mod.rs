//! Domain layer for the Narration context.

pub mod events;
pub mod handle;
pub mod wav;
