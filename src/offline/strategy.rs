//! Caching strategies for intercepted requests.
//!
//! Strategies never propagate errors: every failure path resolves to either
//! a cached response or a synthetic placeholder, because an error escaping
//! this layer would break page loading entirely.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

use super::bucket::{Bucket, StoredResponse};
use crate::error::FetchError;

/// Network seam for the offline cache. Production uses
/// [`HttpResourceFetcher`]; tests substitute counting mocks.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client.
pub struct HttpResourceFetcher {
    client: reqwest::Client,
}

impl HttpResourceFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpResourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpResourceFetcher {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = http::StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(http::StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await?;
        Ok(StoredResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Background refresh handed back by [`stale_while_revalidate`]; the caller
/// decides whether to spawn it or await it directly.
pub type Revalidation = BoxFuture<'static, ()>;

/// Cache First: serve from the bucket when present, otherwise fetch and
/// store. Total failure with nothing cached resolves to a synthetic 404.
pub async fn cache_first(bucket: &Bucket, fetcher: &dyn ResourceFetcher, url: &str) -> StoredResponse {
    if let Some(cached) = bucket.get(url) {
        tracing::debug!(url, bucket = %bucket.name(), "served from bucket");
        return cached;
    }

    match fetcher.fetch(url).await {
        Ok(response) => {
            if response.is_success() {
                bucket.put(url, response.clone());
            }
            response
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "fetch failed with empty bucket");
            StoredResponse::not_found()
        }
    }
}

/// Stale-While-Revalidate: a cached response is returned immediately along
/// with a revalidation future that refreshes the bucket when awaited. With
/// nothing cached the caller waits on the network, falling back to a
/// synthetic 404 on failure.
pub async fn stale_while_revalidate(
    bucket: &Bucket,
    fetcher: &Arc<dyn ResourceFetcher>,
    url: &str,
) -> (StoredResponse, Option<Revalidation>) {
    if let Some(cached) = bucket.get(url) {
        let bucket = bucket.clone();
        let fetcher = Arc::clone(fetcher);
        let url = url.to_string();
        let revalidation = async move {
            match fetcher.fetch(&url).await {
                Ok(response) if response.is_success() => {
                    bucket.put(&url, response);
                }
                Ok(response) => {
                    tracing::debug!(%url, status = %response.status, "revalidation skipped");
                }
                Err(err) => {
                    tracing::debug!(%url, error = %err, "revalidation failed");
                }
            }
        }
        .boxed();
        return (cached, Some(revalidation));
    }

    match fetcher.fetch(url).await {
        Ok(response) => {
            if response.is_success() {
                bucket.put(url, response.clone());
            }
            (response, None)
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "fetch failed with empty bucket");
            (StoredResponse::not_found(), None)
        }
    }
}

/// Network First: prefer a live response, storing a copy when OK; on failure
/// fall back to whatever is stored, or a synthetic 503.
pub async fn network_first(bucket: &Bucket, fetcher: &dyn ResourceFetcher, url: &str) -> StoredResponse {
    match fetcher.fetch(url).await {
        Ok(response) => {
            if response.is_success() {
                bucket.put(url, response.clone());
            }
            response
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "network failed, trying bucket");
            bucket.get(url).unwrap_or_else(StoredResponse::service_unavailable)
        }
    }
}
