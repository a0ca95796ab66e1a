//! Error types for the exlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for exlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No record exists for the given id
    #[error("user not found: {0}")]
    NotFound(String),

    /// The given id is not a well-formed identifier
    #[error("invalid user id: {0}")]
    InvalidId(String),

    /// A required field is missing or could not be coerced
    #[error("{0}")]
    Validation(String),

    /// The record store rejected or failed an operation
    #[error("store error: {0}")]
    Persistence(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
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
}

/// Coarse classification used at the HTTP boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidId,
    Validation,
    Persistence,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidId(_) => ErrorKind::InvalidId,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Persistence(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::Toml(_)
            | Error::Config(_) => ErrorKind::Persistence,
        }
    }
}
