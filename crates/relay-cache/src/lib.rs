//! Response cache for the relay fetch layer.
//!
//! This crate provides:
//! - `CacheStore` - Shared key/value store of serialized responses
//! - `CacheKey` - Deterministic keys derived from endpoint and parameters
//! - `invalidate` - Approval patching across listing entries
//! - `CacheAdmin` - Clear-all and clear-by-endpoint operations
//! - `CacheStats` - Hit/miss counters
//!
//! # Example
//!
//! ```ignore
//! use relay_cache::{CacheAdmin, CacheKey, CacheStore};
//! use relay_core::{Endpoint, EndpointRequest};
//!
//! let store = CacheStore::new();
//! let key = CacheKey::for_request(&EndpointRequest::page(0));
//! store.set(key.as_str(), r#"{"data":[],"nextPage":null}"#);
//!
//! CacheAdmin::new(Some(store.clone())).clear_by_endpoint_prefix(&[Endpoint::PaginatedTransactions]);
//! assert!(store.is_empty());
//! ```

mod admin;
mod error;
mod invalidation;
mod key;
mod stats;
mod store;

pub use admin::CacheAdmin;
pub use error::{CacheError, CacheResult};
pub use invalidation::{invalidate, ApprovalChange, InvalidationReport, PayloadShape};
pub use key::{canonical_json, compute_key, CacheKey, PARAMS_SEPARATOR};
pub use stats::CacheStats;
pub use store::CacheStore;
