//! Versioned response buckets.
//!
//! A bucket is a named url -> response store that remembers insertion order.
//! Trimming evicts oldest-inserted entries first; this is insertion order,
//! not LRU, and reads never reorder entries. `BucketSet` tracks every bucket
//! ever opened so activation can purge the ones from prior versions.

use bytes::Bytes;
use http::StatusCode;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A response held in a bucket: status, content type and body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

impl StoredResponse {
    pub fn new(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.into(),
        }
    }

    pub fn ok(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, content_type, body)
    }

    /// Synthetic placeholder returned when nothing is cached and the network
    /// fetch failed under a cache-first strategy.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "text/plain", "resource not available")
    }

    /// Synthetic placeholder returned when nothing is cached and the network
    /// fetch failed under a network-first strategy.
    pub fn service_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "text/plain",
            "content not available",
        )
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

struct BucketInner {
    entries: HashMap<String, StoredResponse>,
    /// Insertion order of keys; overwrites keep the original position.
    order: VecDeque<String>,
}

/// Named, insertion-ordered url -> response store.
///
/// Clones share the same underlying store, so a revalidation task spawned
/// off a strategy can write back through its own handle.
#[derive(Clone)]
pub struct Bucket {
    name: String,
    inner: Arc<RwLock<BucketInner>>,
}

impl Bucket {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inner: Arc::new(RwLock::new(BucketInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, url: &str) -> Option<StoredResponse> {
        self.inner.read().entries.get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner.read().entries.contains_key(url)
    }

    /// Insert or overwrite. An overwrite keeps the entry's original
    /// insertion position.
    pub fn put(&self, url: &str, response: StoredResponse) {
        let mut inner = self.inner.write();
        if inner.entries.insert(url.to_string(), response).is_none() {
            inner.order.push_back(url.to_string());
        }
    }

    pub fn delete(&self, url: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.entries.remove(url).is_some() {
            inner.order.retain(|k| k != url);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Keys in insertion order, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().order.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Evict oldest-inserted entries until at most `cap` remain. Returns the
    /// number of evicted entries.
    pub fn trim(&self, cap: usize) -> usize {
        let mut inner = self.inner.write();
        let mut removed = 0;
        while inner.entries.len() > cap {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    removed += 1;
                }
                None => break,
            }
        }
        if removed > 0 {
            tracing::info!(bucket = %self.name, removed, "bucket trimmed");
        }
        removed
    }
}

/// Registry of every opened bucket, keyed by versioned name.
pub struct BucketSet {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl BucketSet {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the bucket with this name.
    pub fn open(&self, name: &str) -> Bucket {
        let mut buckets = self.buckets.write();
        buckets
            .entry(name.to_string())
            .or_insert_with(|| Bucket::new(name))
            .clone()
    }

    pub fn delete(&self, name: &str) -> bool {
        self.buckets.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Delete every bucket whose name is not in `keep`. Returns the deleted
    /// names, sorted. Runs at activation, before the new version serves
    /// traffic.
    pub fn purge_except(&self, keep: &[&str]) -> Vec<String> {
        let mut buckets = self.buckets.write();
        let doomed: Vec<String> = buckets
            .keys()
            .filter(|name| !keep.contains(&name.as_str()))
            .cloned()
            .collect();
        for name in &doomed {
            buckets.remove(name);
            tracing::info!(bucket = %name, "obsolete bucket deleted");
        }
        let mut doomed = doomed;
        doomed.sort();
        doomed
    }
}

impl Default for BucketSet {
    fn default() -> Self {
        Self::new()
    }
}
