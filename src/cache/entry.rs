//! Cache entry type for decoded JSON responses.

use serde_json::Value;
use std::time::{Duration, SystemTime};

/// A cached response with an absolute expiry timestamp.
///
/// Entries are never updated in place; a refreshed fetch overwrites the key
/// with a new entry, resetting the expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Decoded JSON payload.
    pub value: Value,
    /// When this entry was created.
    pub stored_at: SystemTime,
    /// When this entry expires.
    pub expires_at: SystemTime,
}

impl CacheEntry {
    pub fn new(value: Value, ttl: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            value,
            stored_at: now,
            expires_at: now + ttl,
        }
    }

    /// An entry is expired once its expiry time has been reached.
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}
