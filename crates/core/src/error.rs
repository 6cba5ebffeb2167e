//! Error types for the scene graph runtime.
//!
//! Scene operations themselves are total; these errors only cover the
//! ambient layer around them (configuration, file access).

use thiserror::Error;

/// Main error type for the scene graph runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Configuration values that parse but make no sense
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias using the runtime's Error type.
pub type Result<T> = std::result::Result<T, Error>;
