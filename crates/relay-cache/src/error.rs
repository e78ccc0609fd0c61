//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when reading or rewriting cache entries.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to serialize or deserialize a value.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored payload does not have the shape its endpoint promises.
    #[error("malformed entry under {key}: {reason}")]
    Malformed { key: String, reason: String },
}
