//! Cached data access for relay.
//!
//! This crate provides:
//! - `Transport` - The boundary to whatever resolves an endpoint to data
//! - `MockTransport` - In-memory employees and transactions
//! - `RequestTracker` - In-flight indicator and failure reporting
//! - `CachingClient` - Cached and uncached fetch entry points
//! - `AppContext` - Owner of the shared cache store
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use relay_core::{EndpointRequest, RelayConfig, Transaction, PaginatedResponse};
//! use relay_data::{AppContext, MockTransport};
//!
//! let config = RelayConfig::default();
//! let ctx = AppContext::new(&config.cache);
//! let client = ctx.client(Arc::new(MockTransport::new(config.transport)));
//!
//! let page: Option<PaginatedResponse<Vec<Transaction>>> =
//!     client.fetch_with_cache(&EndpointRequest::page(0)).await;
//! client.fetch_without_cache::<()>(&EndpointRequest::set_approval("T1", true)).await;
//! ```

mod client;
mod context;
mod mock;
mod tracker;
mod transport;

pub use client::*;
pub use context::*;
pub use mock::*;
pub use tracker::*;
pub use transport::*;
