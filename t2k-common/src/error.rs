//! Common error types for the Top 2000 service

use thiserror::Error;

/// Common result type for Top 2000 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Top 2000 crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Derived data no longer matches its source
    #[error("Stale data: {0}")]
    Stale(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
