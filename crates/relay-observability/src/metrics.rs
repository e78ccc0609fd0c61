//! Cache activity metrics.

use std::collections::BTreeMap;

use relay_cache::{CacheKey, CacheStore};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a cache store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Number of stored entries.
    pub entries: usize,
    /// Entry count per endpoint segment of the key.
    pub entries_by_endpoint: BTreeMap<String, usize>,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that fell through to the transport.
    pub misses: u64,
    /// Responses written.
    pub writes: u64,
    /// Entries rewritten by approval invalidation.
    pub invalidated: u64,
    /// Hits over total lookups.
    pub hit_ratio: f64,
}

impl CacheMetrics {
    /// Capture the current state of a store.
    pub fn capture(store: &CacheStore) -> Self {
        let mut entries_by_endpoint = BTreeMap::new();
        let keys = store.keys();
        for key in &keys {
            let segment = CacheKey::from_raw(key.as_str()).endpoint_segment().to_string();
            *entries_by_endpoint.entry(segment).or_insert(0) += 1;
        }

        let stats = store.stats();
        Self {
            entries: keys.len(),
            entries_by_endpoint,
            hits: stats.hits(),
            misses: stats.misses(),
            writes: stats.writes(),
            invalidated: stats.invalidated(),
            hit_ratio: stats.hit_ratio(),
        }
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as a single human-readable line.
    pub fn to_human(&self) -> String {
        let mut s = format!(
            "{} entries, {} hits, {} misses ({:.0}% hit ratio), {} writes, {} invalidated",
            self.entries,
            self.hits,
            self.misses,
            self.hit_ratio * 100.0,
            self.writes,
            self.invalidated
        );

        if !self.entries_by_endpoint.is_empty() {
            let per_endpoint: Vec<String> = self
                .entries_by_endpoint
                .iter()
                .map(|(endpoint, count)| format!("{}={}", endpoint, count))
                .collect();
            s.push_str(" | ");
            s.push_str(&per_endpoint.join(" "));
        }

        s
    }
}
