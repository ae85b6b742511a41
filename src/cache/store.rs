//! In-memory request cache with per-entry TTL.
//!
//! Shared interior mutability: handles are cheap clones over the same map,
//! so the periodic sweep task and the fetch wrapper can share one cache.
//! Expired entries are deleted lazily on read, opportunistically after every
//! write, and eagerly by `cleanup()`.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::entry::CacheEntry;
use super::stats::{CacheStats, CacheStatsTracker};

/// Outcome of a cache lookup.
///
/// `Expired` hands the stale value back to the caller after removing the
/// entry: the fetch wrapper keeps it in hand as a degraded fallback when the
/// network turns out to be unavailable.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Entry present and within its TTL.
    Fresh(Value),
    /// Entry was present but past expiry; it has been removed.
    Expired(Value),
    /// No entry for this key.
    Miss,
}

/// Key/TTL request cache.
///
/// Keys are the literal `METHOD:url:body` compositions from
/// [`crate::cache::CacheKey`]; invalidation matches on literal substrings of
/// those keys.
#[derive(Clone)]
pub struct RequestCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<CacheStatsTracker>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(CacheStatsTracker::new()),
        }
    }

    /// Get the value for a key while it is fresh.
    ///
    /// An expired entry is deleted before returning `None`. Reads never
    /// extend an entry's TTL.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.lookup(key) {
            Lookup::Fresh(value) => Some(value),
            _ => None,
        }
    }

    /// Like [`get`](Self::get), but an expired entry's value is returned in
    /// `Lookup::Expired` after its removal instead of being dropped.
    pub fn lookup(&self, key: &str) -> Lookup {
        let stale = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => {
                    self.stats.increment_hits();
                    return Lookup::Fresh(entry.value.clone());
                }
                Some(entry) => Some(entry.value.clone()),
                None => None,
            }
        };

        self.stats.increment_misses();
        match stale {
            Some(value) => {
                self.entries.write().remove(key);
                self.stats.add_evictions(1);
                Lookup::Expired(value)
            }
            None => Lookup::Miss,
        }
    }

    /// Insert or overwrite an entry with `expiry = now + ttl`, then sweep
    /// all expired entries.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        self.entries
            .write()
            .insert(key.into(), CacheEntry::new(value, ttl));
        self.cleanup();
    }

    /// Whether a fresh entry exists for the key. Shares `get` semantics: an
    /// expired-but-unswept entry answers `false`.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove every entry whose key contains `fragment` as a literal
    /// substring. Returns the number of removed entries.
    pub fn invalidate(&self, fragment: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(fragment));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(fragment, removed, "cache entries invalidated");
        }
        removed
    }

    /// Remove all expired entries. Returns the number of removed entries.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        drop(entries);
        if removed > 0 {
            self.stats.add_evictions(removed as u64);
        }
        removed
    }

    /// Drop every entry and reset statistics.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.stats.reset();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len() as u64)
    }

    /// Spawn a background task sweeping expired entries on a fixed
    /// wall-clock interval, independent of access patterns.
    pub fn spawn_cleanup_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the initial sweep
            // happens one interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.cleanup();
                if removed > 0 {
                    tracing::debug!(removed, "periodic sweep removed expired entries");
                }
            }
        })
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}
