//! Explicit cache clearing for callers that need fresh data.

use relay_core::Endpoint;
use tracing::info;

use crate::store::CacheStore;

/// Clear-all and clear-by-endpoint operations over an optional store.
///
/// Without a store (cache disabled) every operation is a no-op.
#[derive(Debug, Clone, Default)]
pub struct CacheAdmin {
    store: Option<CacheStore>,
}

impl CacheAdmin {
    /// Create an admin handle over the given store.
    pub fn new(store: Option<CacheStore>) -> Self {
        Self { store }
    }

    /// Drop every cached entry.
    pub fn clear_all(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let dropped = store.len();
        store.clear();
        info!(dropped, "cache cleared");
    }

    /// Drop every entry whose key starts with one of the endpoint identifiers.
    ///
    /// Returns the number of removed entries.
    pub fn clear_by_endpoint_prefix(&self, endpoints: &[Endpoint]) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };
        let prefixes: Vec<&str> = endpoints.iter().map(Endpoint::as_str).collect();
        let removed = store.remove_by_prefix(&prefixes);
        if removed > 0 {
            info!(?endpoints, removed, "cache entries cleared by endpoint");
        }
        removed
    }
}
