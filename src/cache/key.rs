//! Cache key composition
//!
//! A key is the literal concatenation `METHOD:url:body` (empty body segment
//! when the request has none). Two logically identical requests always
//! compose the same string; distinct requests cannot collide because the key
//! is a direct composition, not a hash.

use serde_json::Value;

/// Unique identifier for a cached request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    method: String,
    url: String,
    body: String,
}

impl CacheKey {
    pub fn new(method: &str, url: &str, body: Option<&Value>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.to_string(),
            body: body.map(|b| b.to_string()).unwrap_or_default(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.method, self.url, self.body)
    }
}
