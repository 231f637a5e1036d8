//! Error types for mandi.
//!
//! A single error enum covers configuration, I/O, ingestion and the network
//! collaborators (news and weather). Collaborator errors never reach a user
//! reply; the boundaries convert them into fallback text.

use thiserror::Error;

/// Unified error type for mandi.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rate ingestion errors (directory or workbook level)
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Network or HTTP failure talking to a collaborator
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Expected markup or payload shape absent from a fetched response
    #[error("Parse error: {0}")]
    Parse(String),

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
