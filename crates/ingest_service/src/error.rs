//! Ingest service error types.

use thiserror::Error;

/// Ingest service error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Redis connection or command error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client channel send error (session gone or buffer full).
    #[error("Channel send error")]
    ChannelSend,
}

/// Result type for ingest service operations.
pub type Result<T> = std::result::Result<T, Error>;
