//! Transport boundary.

use async_trait::async_trait;
use relay_cache::CacheError;
use relay_core::{Endpoint, EndpointRequest};
use serde_json::Value;

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("endpoint unavailable: {0}")]
    Unavailable(Endpoint),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Deserialization(e.to_string())
    }
}

impl From<CacheError> for FetchError {
    fn from(e: CacheError) -> Self {
        FetchError::Deserialization(e.to_string())
    }
}

/// Resolves a request against the remote endpoint.
///
/// Retry, timeouts and error classification are the transport's concern;
/// callers only see success or a `FetchError`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request and return the raw JSON response.
    async fn call(&self, request: &EndpointRequest) -> Result<Value, FetchError>;
}
