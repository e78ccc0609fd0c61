//! Cached fetch client.

use std::sync::Arc;

use relay_cache::{invalidate, ApprovalChange, CacheAdmin, CacheKey, CacheStore};
use relay_core::{Endpoint, EndpointRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::tracker::RequestTracker;
use crate::transport::{FetchError, Transport};

/// Fetch client that memoizes responses in a shared cache store.
///
/// Two entry points:
/// - `fetch_with_cache` serves repeat requests from the store and only calls
///   the transport on a miss.
/// - `fetch_without_cache` always calls the transport; a successful approval
///   change patches every cached listing that holds the transaction.
///
/// Without a store every call goes to the transport and nothing is cached.
/// Failures are reported through the `RequestTracker` and surface as `None`.
///
/// The transport call and the cache update that follows it run on a spawned
/// task. A caller that stops waiting only loses the result; the cache write
/// or approval patch still lands once the transport answers.
pub struct CachingClient<T: Transport> {
    transport: Arc<T>,
    cache: Option<CacheStore>,
    admin: CacheAdmin,
    tracker: RequestTracker,
}

impl<T: Transport + 'static> CachingClient<T> {
    /// Create a client over a transport and an optional store.
    pub fn new(transport: Arc<T>, cache: Option<CacheStore>) -> Self {
        Self {
            transport,
            admin: CacheAdmin::new(cache.clone()),
            cache,
            tracker: RequestTracker::new(),
        }
    }

    /// Share an existing tracker, so several clients drive one indicator.
    pub fn with_tracker(mut self, tracker: RequestTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Check if a request is outstanding.
    pub fn loading(&self) -> bool {
        self.tracker.loading()
    }

    /// Get the request tracker.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the cache store, if caching is enabled.
    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Fetch through the cache.
    ///
    /// A cached response is returned without calling the transport. On a miss
    /// the transport response is stored under the request's key.
    pub async fn fetch_with_cache<D: DeserializeOwned>(&self, request: &EndpointRequest) -> Option<D> {
        self.tracker.run(self.load_cached(request)).await
    }

    /// Fetch from the transport, bypassing the cache.
    ///
    /// The request's own key is never written. After a successful approval
    /// change the cached transaction listings are patched in place.
    pub async fn fetch_without_cache<D: DeserializeOwned>(&self, request: &EndpointRequest) -> Option<D> {
        self.tracker.run(self.load_uncached(request)).await
    }

    async fn load_cached<D: DeserializeOwned>(&self, request: &EndpointRequest) -> Result<D, FetchError> {
        let key = CacheKey::for_request(request);

        if let Some(store) = &self.cache {
            if let Some(value) = store.get_json::<D>(key.as_str())? {
                store.stats().record_hit();
                debug!(%key, "cache hit");
                return Ok(value);
            }
            store.stats().record_miss();
            debug!(%key, "cache miss");
        }

        let response = self
            .dispatch(request, move |store, response| match store.set_json(key.as_str(), response) {
                Ok(()) => {
                    store.stats().record_write();
                    debug!(%key, "cached response");
                }
                Err(e) => warn!(%key, error = %e, "failed to cache response"),
            })
            .await?;

        decode(response)
    }

    async fn load_uncached<D: DeserializeOwned>(&self, request: &EndpointRequest) -> Result<D, FetchError> {
        let change = match request {
            EndpointRequest::SetTransactionApproval(params) => Some(ApprovalChange::from(params)),
            _ => None,
        };

        let response = self
            .dispatch(request, move |store, _| {
                if let Some(change) = &change {
                    invalidate(store, change);
                }
            })
            .await?;

        decode(response)
    }

    /// Call the transport on a detached task and apply `on_success` to the
    /// store once it answers, whether or not the caller is still waiting.
    async fn dispatch<F>(&self, request: &EndpointRequest, on_success: F) -> Result<Value, FetchError>
    where
        F: FnOnce(&CacheStore, &Value) + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        let cache = self.cache.clone();
        let request = request.clone();

        let task = tokio::spawn(async move {
            let response = transport.call(&request).await?;
            if let Some(store) = &cache {
                on_success(store, &response);
            }
            Ok::<_, FetchError>(response)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(FetchError::Transport(format!("request task failed: {}", e))),
        }
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.admin.clear_all();
    }

    /// Drop cached responses of the given endpoints.
    ///
    /// Returns the number of removed entries.
    pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) -> usize {
        self.admin.clear_by_endpoint_prefix(endpoints)
    }
}

fn decode<D: DeserializeOwned>(response: Value) -> Result<D, FetchError> {
    Ok(serde_json::from_value(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use relay_core::{Employee, PaginatedResponse, Transaction, TransportConfig};
    use std::time::Duration;

    type Page = PaginatedResponse<Vec<Transaction>>;

    fn client_with(config: TransportConfig, cache: Option<CacheStore>) -> CachingClient<MockTransport> {
        CachingClient::new(Arc::new(MockTransport::new(config)), cache)
    }

    fn cached_client() -> CachingClient<MockTransport> {
        client_with(TransportConfig::default(), Some(CacheStore::new()))
    }

    #[tokio::test]
    async fn test_fetch_with_cache_calls_transport_once() {
        let client = cached_client();
        let request = EndpointRequest::page(0);

        let first: Page = client.fetch_with_cache(&request).await.unwrap();
        let second: Page = client.fetch_with_cache(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 1);

        let stats = client.cache().unwrap().stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.writes(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_see_remote_changes() {
        let client = cached_client();
        let request = EndpointRequest::page(0);

        let _: Page = client.fetch_with_cache(&request).await.unwrap();
        client.transport().call(&EndpointRequest::set_approval("T2", true)).await.unwrap();

        let cached: Page = client.fetch_with_cache(&request).await.unwrap();
        assert!(!cached.data[1].approved);
    }

    #[tokio::test]
    async fn test_distinct_params_use_distinct_entries() {
        let client = cached_client();

        let _: Page = client.fetch_with_cache(&EndpointRequest::page(0)).await.unwrap();
        let _: Page = client.fetch_with_cache(&EndpointRequest::page(1)).await.unwrap();

        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 2);
        assert_eq!(client.cache().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_without_cache_always_calls_transport() {
        let client = cached_client();
        let request = EndpointRequest::by_employee("E1");

        let _: Vec<Transaction> = client.fetch_without_cache(&request).await.unwrap();
        let _: Vec<Transaction> = client.fetch_without_cache(&request).await.unwrap();

        assert_eq!(client.transport().calls(Endpoint::TransactionsByEmployee), 2);
        assert!(client.cache().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_cache_ignores_existing_entry() {
        let client = cached_client();
        let request = EndpointRequest::Employees;
        let key = CacheKey::for_request(&request);
        client.cache().unwrap().set(key.as_str(), "[]");

        let employees: Vec<Employee> = client.fetch_without_cache(&request).await.unwrap();

        assert_eq!(employees.len(), 3);
        assert_eq!(client.cache().unwrap().get(key.as_str()).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_approval_patches_both_listing_shapes() {
        let client = cached_client();
        let page_request = EndpointRequest::page(0);
        let employee_request = EndpointRequest::by_employee("E1");

        let before_page: Page = client.fetch_with_cache(&page_request).await.unwrap();
        let before_employee: Vec<Transaction> = client.fetch_with_cache(&employee_request).await.unwrap();
        assert!(!before_page.data[0].approved);

        let done: Option<()> = client
            .fetch_without_cache(&EndpointRequest::set_approval("T1", true))
            .await;
        assert_eq!(done, Some(()));

        let after_page: Page = client.fetch_with_cache(&page_request).await.unwrap();
        let after_employee: Vec<Transaction> = client.fetch_with_cache(&employee_request).await.unwrap();

        assert!(after_page.data[0].approved);
        assert_eq!(after_page.data[1..], before_page.data[1..]);
        assert_eq!(after_page.next_page, before_page.next_page);

        let t1 = after_employee.iter().find(|tx| tx.id == "T1").unwrap();
        assert!(t1.approved);
        let others_after: Vec<_> = after_employee.iter().filter(|tx| tx.id != "T1").collect();
        let others_before: Vec<_> = before_employee.iter().filter(|tx| tx.id != "T1").collect();
        assert_eq!(others_after, others_before);

        // Served from the patched cache, not the transport.
        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 1);
        assert_eq!(client.transport().calls(Endpoint::TransactionsByEmployee), 1);
        assert!(!client.cache().unwrap().keys().iter().any(|k| k.starts_with("setTransactionApproval")));
    }

    #[tokio::test]
    async fn test_patched_entry_matches_fresh_response_bytes() {
        let client = cached_client();
        let page_request = EndpointRequest::page(0);
        let key = CacheKey::for_request(&page_request);

        let _: Page = client.fetch_with_cache(&page_request).await.unwrap();
        let _: Option<()> = client
            .fetch_without_cache(&EndpointRequest::set_approval("T2", true))
            .await;
        let patched = client.cache().unwrap().get(key.as_str()).unwrap();

        let fresh = client.transport().call(&page_request).await.unwrap().to_string();
        assert_eq!(patched, fresh);
    }

    #[tokio::test]
    async fn test_failed_approval_does_not_patch() {
        let client = cached_client();
        let page_request = EndpointRequest::page(0);
        let key = CacheKey::for_request(&page_request);
        let _: Page = client.fetch_with_cache(&page_request).await.unwrap();
        let before = client.cache().unwrap().get(key.as_str());

        let result: Option<()> = client
            .fetch_without_cache(&EndpointRequest::set_approval("T404", true))
            .await;

        assert_eq!(result, None);
        assert_eq!(client.cache().unwrap().get(key.as_str()), before);
        assert!(matches!(client.tracker().last_error(), Some(FetchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_none_and_caches_nothing() {
        let config = TransportConfig {
            fail_endpoints: vec![Endpoint::Employees],
            ..TransportConfig::default()
        };
        let client = client_with(config, Some(CacheStore::new()));

        let result: Option<Vec<Employee>> = client.fetch_with_cache(&EndpointRequest::Employees).await;

        assert_eq!(result, None);
        assert!(client.cache().unwrap().is_empty());
        assert!(!client.loading());
        assert_eq!(
            client.tracker().last_error(),
            Some(FetchError::Unavailable(Endpoint::Employees))
        );
    }

    #[tokio::test]
    async fn test_wrong_result_type_reported() {
        let client = cached_client();
        let result: Option<Vec<u32>> = client.fetch_with_cache(&EndpointRequest::Employees).await;

        assert_eq!(result, None);
        assert!(matches!(client.tracker().last_error(), Some(FetchError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_disabled_cache_passes_through() {
        let client = client_with(TransportConfig::default(), None);
        let request = EndpointRequest::page(0);

        let first: Option<Page> = client.fetch_with_cache(&request).await;
        let second: Option<Page> = client.fetch_with_cache(&request).await;
        let approval: Option<()> = client
            .fetch_without_cache(&EndpointRequest::set_approval("T1", true))
            .await;
        client.clear_cache();
        assert_eq!(client.clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions]), 0);

        assert!(first.is_some() && second.is_some() && approval.is_some());
        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 2);
        assert!(client.cache().is_none());
    }

    #[tokio::test]
    async fn test_clear_operations() {
        let client = cached_client();
        let _: Page = client.fetch_with_cache(&EndpointRequest::page(0)).await.unwrap();
        let _: Vec<Transaction> = client.fetch_with_cache(&EndpointRequest::by_employee("E1")).await.unwrap();
        let _: Vec<Employee> = client.fetch_with_cache(&EndpointRequest::Employees).await.unwrap();

        let removed = client.clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions]);
        assert_eq!(removed, 1);
        assert_eq!(client.cache().unwrap().len(), 2);

        let _: Page = client.fetch_with_cache(&EndpointRequest::page(0)).await.unwrap();
        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 2);

        client.clear_cache();
        assert!(client.cache().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loading_while_transport_pending() {
        let config = TransportConfig {
            latency_ms: 20,
            ..TransportConfig::default()
        };
        let client = client_with(config, Some(CacheStore::new()));

        let (result, seen_loading) = tokio::join!(
            client.fetch_with_cache::<Vec<Employee>>(&EndpointRequest::Employees),
            async {
                tokio::task::yield_now().await;
                client.loading()
            }
        );

        assert!(result.is_some());
        assert!(seen_loading);
        assert!(!client.loading());
    }

    #[tokio::test]
    async fn test_concurrent_cold_reads_both_hit_transport() {
        let config = TransportConfig {
            latency_ms: 10,
            ..TransportConfig::default()
        };
        let client = client_with(config, Some(CacheStore::new()));
        let request = EndpointRequest::page(1);

        let (a, b) = tokio::join!(
            client.fetch_with_cache::<Page>(&request),
            client.fetch_with_cache::<Page>(&request)
        );

        assert_eq!(a, b);
        assert_eq!(client.transport().calls(Endpoint::PaginatedTransactions), 2);
        assert_eq!(client.cache().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_calls_still_update_cache() {
        let store = CacheStore::new();
        let listing_request = EndpointRequest::by_employee("E1");
        let warm = client_with(TransportConfig::default(), Some(store.clone()));
        let before: Vec<Transaction> = warm.fetch_with_cache(&listing_request).await.unwrap();
        assert!(!before.iter().find(|tx| tx.id == "T1").unwrap().approved);

        let slow = client_with(
            TransportConfig {
                latency_ms: 50,
                ..TransportConfig::default()
            },
            Some(store.clone()),
        );
        let wait = Duration::from_millis(10);

        let approval = EndpointRequest::set_approval("T1", true);
        let abandoned = tokio::time::timeout(wait, slow.fetch_without_cache::<()>(&approval)).await;
        assert!(abandoned.is_err());

        let abandoned =
            tokio::time::timeout(wait, slow.fetch_with_cache::<Vec<Employee>>(&EndpointRequest::Employees)).await;
        assert!(abandoned.is_err());
        assert!(!slow.loading());

        tokio::time::sleep(Duration::from_millis(120)).await;

        let key = CacheKey::for_request(&listing_request);
        let after: Vec<Transaction> = store.get_json(key.as_str()).unwrap().unwrap();
        assert!(after.iter().find(|tx| tx.id == "T1").unwrap().approved);
        assert!(store.contains("employees"));
        assert!(slow.transport().transaction("T1").unwrap().approved);
    }
}
