//! Application layer for the Story context.

pub mod creator;
pub mod session_controller;
