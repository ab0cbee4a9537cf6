//! Error types for tally-core

use thiserror::Error;

/// Result type alias using tally-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any failed call to the voting backend (network, status, or body)
    #[error("{0}")]
    Backend(String),

    /// Destructive operation attempted without the expected confirmation
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),
}

impl Error {
    /// Whether this error came from the voting backend rather than local state.
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
