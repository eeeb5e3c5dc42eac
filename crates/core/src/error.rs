//! Error types for Newsdesk.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! search backend, language-model and prompt errors.

use thiserror::Error;

/// Unified error type for Newsdesk.
///
/// All fallible functions return `Result<T, AppError>`. Backend-specific
/// errors (HTTP, JSON) are converted at the client boundary so that callers
/// only ever see one of these variants.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable connection to the search backend
    #[error("Search backend unavailable: {0}")]
    SearchUnavailable(String),

    /// Query, transport or decode error during a search call
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Language-model call failed (auth, rate limit, transport, bad payload)
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
