//! Error types.
//!
//! `StoreError` covers everything that can go wrong talking to a record source
//! or to the durable state store. `ApiError` is what construction, configuration
//! and the CLI surface. The resolvers themselves never return either: they log
//! and degrade.

use thiserror::Error;

/// Failures of the backing record source or the durable state store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status} for table {table}: {body}")]
    Backend {
        table: String,
        status: u16,
        body: String,
    },

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Record source unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for wiring, configuration and CLI operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
