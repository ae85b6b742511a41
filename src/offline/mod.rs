//! Offline resource cache: an installable interceptor over page requests.
//!
//! Mirrors the browser worker lifecycle: install precaches static resources,
//! activate purges buckets left over from prior versions, then every GET is
//! classified and dispatched to a strategy. Non-GET and API requests pass
//! through untouched so mutable backend state is never served stale from
//! this layer.

mod bucket;
mod classify;
mod strategy;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::OfflineConfig;
use crate::error::FetchError;

pub use bucket::{Bucket, BucketSet, StoredResponse};
pub use classify::{Classifier, ResourceClass};
pub use strategy::{
    cache_first, network_first, stale_while_revalidate, HttpResourceFetcher, ResourceFetcher,
    Revalidation,
};

/// Lifecycle state of the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    /// Created; precaching may still be in progress or failed.
    Installing,
    /// Serving traffic for this version.
    Active { version: String },
    /// Replaced by a newer version; no longer serving.
    Superseded,
}

/// External control messages triggering bucket maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    CleanImageCache,
    CleanCardCache,
}

/// The offline resource cache.
pub struct OfflineCache {
    buckets: BucketSet,
    generic_bucket: Bucket,
    image_bucket: Bucket,
    card_bucket: Bucket,
    classifier: Classifier,
    fetcher: Arc<dyn ResourceFetcher>,
    state: RwLock<WorkerState>,
    config: OfflineConfig,
}

impl OfflineCache {
    pub fn new(config: OfflineConfig, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let buckets = BucketSet::new();
        let generic_bucket = buckets.open(&config.cache_name);
        let image_bucket = buckets.open(&config.image_cache_name);
        let card_bucket = buckets.open(&config.card_cache_name);
        let classifier = Classifier::new(&config);

        Self {
            buckets,
            generic_bucket,
            image_bucket,
            card_bucket,
            classifier,
            fetcher,
            state: RwLock::new(WorkerState::Installing),
            config,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state.read().clone()
    }

    /// Registry of every opened bucket, including prior-version leftovers.
    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    pub fn generic_bucket(&self) -> &Bucket {
        &self.generic_bucket
    }

    pub fn image_bucket(&self) -> &Bucket {
        &self.image_bucket
    }

    pub fn card_bucket(&self) -> &Bucket {
        &self.card_bucket
    }

    /// Fetch and store every configured static resource in the generic
    /// bucket. Any failure fails the install; the worker stays in
    /// `Installing` and must not be activated.
    pub async fn install(&self) -> Result<(), FetchError> {
        for url in &self.config.precache {
            let response = self.fetcher.fetch(url).await?;
            if !response.is_success() {
                return Err(FetchError::RequestFailed {
                    status: response.status.as_u16(),
                    message: format!("precache fetch for {} failed", url),
                });
            }
            self.generic_bucket.put(url, response);
        }
        tracing::info!(count = self.config.precache.len(), "static resources precached");
        Ok(())
    }

    /// Purge buckets from prior versions and claim control. Returns the
    /// deleted bucket names. Runs exactly once per version upgrade, before
    /// this version serves traffic.
    pub fn activate(&self) -> Vec<String> {
        let keep = [
            self.config.cache_name.as_str(),
            self.config.image_cache_name.as_str(),
            self.config.card_cache_name.as_str(),
        ];
        let deleted = self.buckets.purge_except(&keep);
        *self.state.write() = WorkerState::Active {
            version: self.config.cache_name.clone(),
        };
        tracing::info!(deleted = deleted.len(), "worker activated");
        deleted
    }

    /// Mark this worker as replaced by a newer version.
    pub fn supersede(&self) {
        *self.state.write() = WorkerState::Superseded;
    }

    /// Intercept a request. `None` means pass through untouched: non-GET
    /// methods and API paths are never served from this layer.
    pub async fn handle_fetch(&self, method: &str, url: &str) -> Option<StoredResponse> {
        if !method.eq_ignore_ascii_case("GET") {
            return None;
        }

        match self.classifier.classify(url) {
            ResourceClass::CardImage => {
                Some(cache_first(&self.card_bucket, self.fetcher.as_ref(), url).await)
            }
            ResourceClass::GenericImage => {
                Some(cache_first(&self.image_bucket, self.fetcher.as_ref(), url).await)
            }
            ResourceClass::StaticResource => {
                let (response, revalidation) =
                    stale_while_revalidate(&self.generic_bucket, &self.fetcher, url).await;
                if let Some(task) = revalidation {
                    tokio::spawn(task);
                }
                Some(response)
            }
            ResourceClass::Api => None,
            ResourceClass::Other => {
                Some(network_first(&self.generic_bucket, self.fetcher.as_ref(), url).await)
            }
        }
    }

    /// Apply a maintenance message. Trimming happens only here, on demand,
    /// so buckets can transiently exceed their caps between messages.
    /// Returns the number of evicted entries.
    pub fn handle_message(&self, message: ControlMessage) -> usize {
        match message {
            ControlMessage::CleanImageCache => self.image_bucket.trim(self.config.image_cache_cap),
            ControlMessage::CleanCardCache => self.card_bucket.trim(self.config.card_cache_cap),
        }
    }
}
