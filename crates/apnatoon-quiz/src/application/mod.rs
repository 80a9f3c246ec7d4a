//! Application layer for the Quiz context.

pub mod controller;
