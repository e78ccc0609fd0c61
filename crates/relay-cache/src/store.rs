//! Shared key/value store of serialized responses.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CacheResult;
use crate::stats::CacheStats;

/// Mapping from cache key to serialized JSON payload.
///
/// Cloning the store clones the handle: all clones see the same entries.
/// Every operation takes the lock once and releases it before returning, so
/// no lock is ever held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    stats: Arc<CacheStats>,
}

impl CacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // Entries are plain strings; a panic mid-operation cannot leave them half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the raw payload stored under a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store a raw payload, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, payload: impl Into<String>) {
        self.lock().insert(key.into(), payload.into());
    }

    /// Get and deserialize a value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get(key) {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        self.set(key, payload);
        Ok(())
    }

    /// Delete a key. Returns true if it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Get all keys, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Copy of every entry, in key order.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace the contents with an empty mapping.
    pub fn clear(&self) {
        *self.lock() = BTreeMap::new();
    }

    /// Remove every key starting with any of the given prefixes.
    ///
    /// Returns the number of removed entries.
    pub fn remove_by_prefix(&self, prefixes: &[&str]) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !prefixes.iter().any(|prefix| key.starts_with(prefix)));
        before - entries.len()
    }

    /// Run a closure with exclusive access to all entries.
    ///
    /// Used for multi-key rewrites that must not interleave with other
    /// cache operations.
    pub(crate) fn with_entries<R>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> R) -> R {
        let mut entries = self.lock();
        f(&mut *entries)
    }

    /// Hit/miss counters shared by all clones of this store.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = CacheStore::new();
        assert_eq!(store.get("employees"), None);

        store.set("employees", "[]");
        assert_eq!(store.get("employees").as_deref(), Some("[]"));
        assert!(store.contains("employees"));

        assert!(store.delete("employees"));
        assert!(!store.delete("employees"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = CacheStore::new();
        let other = store.clone();

        other.set("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));

        store.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_json_helpers() {
        let store = CacheStore::new();
        store.set_json("nums", &vec![1, 2, 3]).unwrap();

        let nums: Option<Vec<u32>> = store.get_json("nums").unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = store.get_json("missing").unwrap();
        assert_eq!(missing, None);

        store.set("bad", "{not json");
        assert!(store.get_json::<Vec<u32>>("bad").is_err());
    }

    #[test]
    fn test_remove_by_prefix() {
        let store = CacheStore::new();
        store.set("paginatedTransactions@{\"page\":0}", "{}");
        store.set("paginatedTransactions@{\"page\":1}", "{}");
        store.set("transactionsByEmployee@{\"employeeId\":\"E1\"}", "[]");
        store.set("employees", "[]");

        let removed = store.remove_by_prefix(&["paginatedTransactions", "employees"]);
        assert_eq!(removed, 3);
        assert_eq!(store.keys(), vec!["transactionsByEmployee@{\"employeeId\":\"E1\"}".to_string()]);

        assert_eq!(store.remove_by_prefix(&["nothing"]), 0);
        assert_eq!(store.remove_by_prefix(&[]), 0);
    }

    #[test]
    fn test_keys_sorted() {
        let store = CacheStore::new();
        store.set("b", "2");
        store.set("a", "1");
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.len(), 2);
    }
}
