//! Common error types for elevarkiv

use thiserror::Error;

/// Common result type for elevarkiv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the elevarkiv services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller is not permitted to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream collaborator (roster source or archive) failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
