//! Apna TOON — tool error types.

use apnatoon_core::config::ConfigError;
use thiserror::Error;

/// Startup and runtime errors for the command-line tools.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is set to an unusable value.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The command line could not be understood.
    #[error("usage: {0}")]
    Usage(String),
}
