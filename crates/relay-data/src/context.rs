//! Application context owning the shared cache store.

use std::sync::Arc;

use relay_cache::CacheStore;
use relay_core::CacheConfig;
use tracing::info;

use crate::client::CachingClient;
use crate::tracker::RequestTracker;
use crate::transport::Transport;

/// Long-lived owner of the response cache.
///
/// Clients built from the same context share one store and one loading
/// indicator. A context created with caching disabled hands out clients that
/// always hit the transport.
#[derive(Debug, Clone)]
pub struct AppContext {
    cache: Option<CacheStore>,
    tracker: RequestTracker,
}

impl AppContext {
    /// Create a context from cache settings.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: config.enabled.then(CacheStore::new),
            tracker: RequestTracker::new(),
        }
    }

    /// Create a context with caching disabled.
    pub fn without_cache() -> Self {
        Self {
            cache: None,
            tracker: RequestTracker::new(),
        }
    }

    /// Get the shared store, if caching is enabled.
    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Check if any client of this context has a request outstanding.
    pub fn loading(&self) -> bool {
        self.tracker.loading()
    }

    /// Drop all cached data and statistics, e.g. on logout.
    pub fn reset_cache(&self) {
        if let Some(store) = &self.cache {
            store.clear();
            store.stats().reset();
            info!("context cache reset");
        }
    }

    /// Build a client over this context's store and loading indicator.
    pub fn client<T: Transport + 'static>(&self, transport: Arc<T>) -> CachingClient<T> {
        CachingClient::new(transport, self.cache.clone()).with_tracker(self.tracker.clone())
    }
}
