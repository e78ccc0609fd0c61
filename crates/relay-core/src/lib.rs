//! Core abstractions for the relay request cache.
//!
//! This crate provides the fundamental types shared by the cache and the
//! fetch layer:
//! - `Endpoint` - Registered endpoint identifiers
//! - `EndpointRequest` - Typed request parameters, one variant per endpoint
//! - `Employee` / `Transaction` - Domain records served by the endpoints
//! - `RelayConfig` - Cache, transport and logging configuration

mod config;
mod endpoint;
mod model;
mod request;

pub use config::*;
pub use endpoint::*;
pub use model::*;
pub use request::*;
