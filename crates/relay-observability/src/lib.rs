//! Observability for relay.
//!
//! This crate provides:
//! - `init_logging` - Installs the global tracing subscriber
//! - `CacheMetrics` - Point-in-time view of cache activity

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
