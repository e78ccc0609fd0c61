//! Cache key composition.

use relay_core::{Endpoint, EndpointRequest};
use serde_json::{Map, Value};

/// Separator between the endpoint identifier and the serialized parameters.
pub const PARAMS_SEPARATOR: char = '@';

/// A cache key uniquely identifying an endpoint and its parameters.
///
/// Format: `<endpoint>` or `<endpoint>@<canonical JSON params>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    key: String,
}

impl CacheKey {
    /// Wrap an existing key string.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Compute the key for a typed request.
    pub fn for_request(request: &EndpointRequest) -> Self {
        compute_key(request.endpoint().as_str(), request.params().as_ref())
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The endpoint identifier part of the key.
    pub fn endpoint_segment(&self) -> &str {
        endpoint_segment(&self.key)
    }

    /// The registered endpoint this key belongs to, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.endpoint_segment().parse().ok()
    }

    /// Consume the key, returning the string.
    pub fn into_string(self) -> String {
        self.key
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Derive the cache key for an endpoint and optional parameters.
///
/// Absent parameters, `null` and `{}` all produce the bare endpoint.
pub fn compute_key(endpoint: &str, params: Option<&Value>) -> CacheKey {
    match params {
        None | Some(Value::Null) => CacheKey::from_raw(endpoint),
        Some(Value::Object(map)) if map.is_empty() => CacheKey::from_raw(endpoint),
        Some(params) => CacheKey::from_raw(format!(
            "{}{}{}",
            endpoint,
            PARAMS_SEPARATOR,
            canonical_json(params)
        )),
    }
}

/// Compact JSON with object keys sorted at every depth.
///
/// Structurally equal values produce identical strings regardless of the
/// order their fields were inserted in.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::new();
            for (name, field) in fields {
                sorted.insert(name.clone(), canonicalize(field));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

pub(crate) fn endpoint_segment(key: &str) -> &str {
    key.split_once(PARAMS_SEPARATOR).map_or(key, |(endpoint, _)| endpoint)
}
