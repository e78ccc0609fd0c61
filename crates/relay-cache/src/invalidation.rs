//! Approval patching across cached transaction listings.
//!
//! Transactions are cached under two differently shaped endpoints: the
//! paginated listing wraps its records in `{ "data": [...], ... }` while the
//! per-employee listing is a bare array. When an approval change succeeds,
//! every cached listing containing the transaction is rewritten in place so
//! the cache stays consistent without a flush.

use relay_core::{Endpoint, SetTransactionApprovalParams};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};
use crate::key::endpoint_segment;
use crate::store::CacheStore;

/// A successful approval change to propagate into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalChange {
    /// Transaction whose approval changed.
    pub transaction_id: String,
    /// New approval state.
    pub approved: bool,
}

impl ApprovalChange {
    /// Create a new approval change.
    pub fn new(transaction_id: impl Into<String>, approved: bool) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            approved,
        }
    }
}

impl From<&SetTransactionApprovalParams> for ApprovalChange {
    fn from(params: &SetTransactionApprovalParams) -> Self {
        Self::new(params.transaction_id.clone(), params.value)
    }
}

/// Payload shapes the invalidation pass knows how to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{ "data": [record, ...], <pagination fields> }`
    Paginated,
    /// `[record, ...]`
    Flat,
}

impl PayloadShape {
    /// The shape cached under an endpoint, if it holds transaction records.
    pub fn for_endpoint(endpoint: Endpoint) -> Option<Self> {
        match endpoint {
            Endpoint::PaginatedTransactions => Some(Self::Paginated),
            Endpoint::TransactionsByEmployee => Some(Self::Flat),
            Endpoint::Employees | Endpoint::SetTransactionApproval => None,
        }
    }

    fn records_mut<'a>(&self, payload: &'a mut Value) -> Option<&'a mut Vec<Value>> {
        match self {
            Self::Paginated => payload.get_mut("data")?.as_array_mut(),
            Self::Flat => payload.as_array_mut(),
        }
    }

    /// Apply an approval change to a serialized payload of this shape.
    ///
    /// Returns `Ok(None)` when no record matched, so the entry can be left
    /// untouched. Field order and every other field are preserved.
    pub fn rewrite(&self, key: &str, payload: &str, change: &ApprovalChange) -> CacheResult<Option<String>> {
        let mut value: Value = serde_json::from_str(payload).map_err(|e| CacheError::Malformed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let records = self.records_mut(&mut value).ok_or_else(|| CacheError::Malformed {
            key: key.to_string(),
            reason: match self {
                Self::Paginated => "expected an object with a data array".to_string(),
                Self::Flat => "expected an array of records".to_string(),
            },
        })?;

        let mut matched = false;
        for record in records.iter_mut() {
            let is_target = record.get("id").and_then(Value::as_str) == Some(change.transaction_id.as_str());
            if !is_target {
                continue;
            }
            if let Some(fields) = record.as_object_mut() {
                fields.insert("approved".to_string(), Value::Bool(change.approved));
                matched = true;
            }
        }

        Ok(matched.then(|| value.to_string()))
    }
}

/// Outcome of an invalidation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Keys whose payload was rewritten.
    pub rewritten: Vec<String>,
    /// Keys skipped because their payload could not be parsed.
    pub skipped: Vec<String>,
}

impl InvalidationReport {
    /// Check if nothing was rewritten or skipped.
    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty() && self.skipped.is_empty()
    }
}

/// Rewrite every cached transaction listing that contains the changed record.
///
/// Keys are selected by their parsed endpoint, not by raw prefix. Malformed
/// entries are logged and skipped; they never stop the remaining keys from
/// being processed. The pass holds the store lock for its whole duration.
pub fn invalidate(store: &CacheStore, change: &ApprovalChange) -> InvalidationReport {
    let mut report = InvalidationReport::default();

    store.with_entries(|entries| {
        for (key, payload) in entries.iter_mut() {
            let shape = endpoint_segment(key)
                .parse::<Endpoint>()
                .ok()
                .and_then(PayloadShape::for_endpoint);
            let Some(shape) = shape else {
                continue;
            };

            match shape.rewrite(key, payload, change) {
                Ok(Some(updated)) => {
                    debug!(key = %key, "patched cached listing");
                    *payload = updated;
                    report.rewritten.push(key.clone());
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "skipping cache entry during invalidation");
                    report.skipped.push(key.clone());
                }
            }
        }
    });

    store.stats().record_invalidated(report.rewritten.len() as u64);
    info!(
        transaction_id = %change.transaction_id,
        approved = change.approved,
        rewritten = report.rewritten.len(),
        skipped = report.skipped.len(),
        "approval propagated to cache"
    );

    report
}
