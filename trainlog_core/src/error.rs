//! Error types for the trainlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for trainlog_core operations
///
/// Only I/O and configuration surface errors. The analytics engines report
/// missing data as `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table layout does not match the expected columns
    #[error("Schema error: {0}")]
    Schema(String),

    /// User-supplied value could not be understood
    #[error("Invalid input: {0}")]
    Input(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
