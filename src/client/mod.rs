//! API client: the cache-aware fetch wrapper and typed endpoint helpers.
//!
//! `fetch_data` is the single entry point page code goes through for JSON
//! requests. GET responses are cached with a TTL classified from the URL;
//! on network failure a previously cached value (even an expired one) is
//! returned instead of the error, trading staleness for availability.

mod transport;

use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheKey, Lookup, RequestCache, TtlPolicy};
use crate::config::{CacheConfig, ClientConfig};
use crate::error::FetchError;

pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

const GENERIC_ERROR_MESSAGE: &str = "request failed";

/// Cache-aware JSON API client.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: RequestCache,
    ttl: TtlPolicy,
    base_url: String,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, client_config: ClientConfig, cache_config: CacheConfig) -> Self {
        Self {
            transport,
            cache: RequestCache::new(),
            ttl: TtlPolicy::new(cache_config),
            base_url: client_config.base_url,
        }
    }

    /// Client over a plain `reqwest` transport with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new()),
            ClientConfig::default(),
            CacheConfig::default(),
        )
    }

    /// The underlying request cache, for explicit invalidation, maintenance
    /// scheduling, and statistics.
    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Fetch JSON from `url`.
    ///
    /// GET requests with `use_cache` are served from the request cache while
    /// fresh, without touching the network. Responses to such requests are
    /// stored with the TTL class of the URL. On a network-level failure any
    /// previously cached value for the key, fresh or expired, is returned
    /// silently instead of the error.
    pub async fn fetch_data(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
        use_cache: bool,
    ) -> Result<Value, FetchError> {
        let key = CacheKey::new(method, url, body).to_string();
        let cacheable = method.eq_ignore_ascii_case("GET") && use_cache;

        let mut stale = None;
        if cacheable {
            match self.cache.lookup(&key) {
                Lookup::Fresh(value) => {
                    tracing::debug!(url, "request served from cache");
                    return Ok(value);
                }
                Lookup::Expired(value) => stale = Some(value),
                Lookup::Miss => {}
            }
        }

        let request = HttpRequest::new(method, url, body);
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(FetchError::NetworkUnavailable(reason)) => {
                if let Some(value) = stale {
                    tracing::warn!(url, %reason, "network unavailable, serving stale cached value");
                    return Ok(value);
                }
                return Err(FetchError::NetworkUnavailable(reason));
            }
            Err(err) => return Err(err),
        };

        if !response.is_success() {
            return Err(FetchError::RequestFailed {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        let value: Value =
            serde_json::from_slice(&response.body).map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

        if cacheable {
            let ttl = self.ttl.ttl_for(url);
            tracing::debug!(url, ttl_secs = ttl.as_secs(), "response stored in cache");
            self.cache.set(key, value.clone(), ttl);
        }

        Ok(value)
    }

    /// Cached GET.
    pub async fn get(&self, url: &str) -> Result<Value, FetchError> {
        self.fetch_data(url, "GET", None, true).await
    }

    /// Uncacheable mutation followed by substring invalidation, the
    /// post-mutation busting page code does after every create/update/delete.
    pub async fn mutate(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
        invalidate: &str,
    ) -> Result<Value, FetchError> {
        let value = self.fetch_data(url, method, body, false).await?;
        self.cache.invalidate(invalidate);
        Ok(value)
    }

    // Typed endpoint helpers over the REST backend.

    pub async fn collections(&self) -> Result<Value, FetchError> {
        self.get(&self.endpoint("/api/colecciones")).await
    }

    pub async fn cards(&self) -> Result<Value, FetchError> {
        self.get(&self.endpoint("/api/cartas")).await
    }

    pub async fn collection(&self, id: &str) -> Result<Value, FetchError> {
        self.get(&self.endpoint(&format!("/api/colecciones/{}", id)))
            .await
    }

    pub async fn collection_cards(&self, id: &str) -> Result<Value, FetchError> {
        self.get(&self.endpoint(&format!("/api/colecciones/{}/cartas", id)))
            .await
    }

    pub async fn card(&self, id: &str) -> Result<Value, FetchError> {
        self.get(&self.endpoint(&format!("/api/cartas/{}", id))).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Extract the server-supplied `"error"` message from an error body, falling
/// back to a generic message when the body is absent or unparseable.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport mock returning queued responses and counting calls.
    struct MockTransport {
        responses: Mutex<Vec<Result<HttpResponse, FetchError>>>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(responses: Vec<Result<HttpResponse, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }

        fn ok(value: Value) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse {
                status: 200,
                body: Bytes::from(value.to_string()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                return Err(FetchError::NetworkUnavailable("no queued response".to_string()));
            }
            responses.remove(0)
        }
    }

    fn client_with(transport: Arc<MockTransport>) -> ApiClient {
        ApiClient::new(transport, ClientConfig::default(), CacheConfig::default())
    }

    #[tokio::test]
    async fn test_second_get_within_ttl_skips_network() {
        let transport = MockTransport::new(vec![MockTransport::ok(json!([{"_id": 1}]))]);
        let client = client_with(transport.clone());

        let first = client.fetch_data("/api/colecciones", "GET", None, true).await.unwrap();
        let second = client.fetch_data("/api/colecciones", "GET", None, true).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_use_cache_false_always_hits_network() {
        let transport = MockTransport::new(vec![
            MockTransport::ok(json!(1)),
            MockTransport::ok(json!(2)),
        ]);
        let client = client_with(transport.clone());

        client.fetch_data("/api/colecciones", "GET", None, false).await.unwrap();
        let second = client.fetch_data("/api/colecciones", "GET", None, false).await.unwrap();

        assert_eq!(second, json!(2));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_post_is_never_cached() {
        let transport = MockTransport::new(vec![
            MockTransport::ok(json!({"ok": 1})),
            MockTransport::ok(json!({"ok": 2})),
        ]);
        let client = client_with(transport.clone());
        let body = json!({"nombre": "carta"});

        client.fetch_data("/api/cartas", "POST", Some(&body), true).await.unwrap();
        client.fetch_data("/api/cartas", "POST", Some(&body), true).await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_after_expiry_returns_stale_value() {
        let transport = MockTransport::new(vec![
            MockTransport::ok(json!({"nombre": "cofre"})),
            Err(FetchError::NetworkUnavailable("offline".to_string())),
        ]);
        let cache_config = CacheConfig {
            collections_ttl_secs: 1,
            ..CacheConfig::default()
        };
        let client = ApiClient::new(transport.clone(), ClientConfig::default(), cache_config);

        let first = client.fetch_data("/api/colecciones", "GET", None, true).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let fallback = client.fetch_data("/api/colecciones", "GET", None, true).await.unwrap();

        assert_eq!(first, fallback);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_without_cached_value_propagates() {
        let transport = MockTransport::new(vec![Err(FetchError::NetworkUnavailable(
            "offline".to_string(),
        ))]);
        let client = client_with(transport);

        let result = client.fetch_data("/api/colecciones", "GET", None, true).await;
        assert!(matches!(result, Err(FetchError::NetworkUnavailable(_))));
    }

    #[tokio::test]
    async fn test_http_error_carries_server_message() {
        let transport = MockTransport::new(vec![Ok(HttpResponse {
            status: 404,
            body: Bytes::from(r#"{"error": "coleccion no encontrada"}"#),
        })]);
        let client = client_with(transport);

        let result = client.fetch_data("/api/colecciones/99", "GET", None, true).await;
        match result {
            Err(FetchError::RequestFailed { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "coleccion no encontrada");
            }
            other => panic!("expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_with_unparseable_body_uses_generic_message() {
        let transport = MockTransport::new(vec![Ok(HttpResponse {
            status: 500,
            body: Bytes::from("<html>boom</html>"),
        })]);
        let client = client_with(transport);

        let result = client.fetch_data("/api/cartas", "GET", None, true).await;
        match result {
            Err(FetchError::RequestFailed { message, .. }) => {
                assert_eq!(message, GENERIC_ERROR_MESSAGE);
            }
            other => panic!("expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_errors_are_not_cached() {
        let transport = MockTransport::new(vec![
            Ok(HttpResponse {
                status: 500,
                body: Bytes::from(r#"{"error": "boom"}"#),
            }),
            MockTransport::ok(json!([1])),
        ]);
        let client = client_with(transport.clone());

        assert!(client.fetch_data("/api/cartas", "GET", None, true).await.is_err());
        let second = client.fetch_data("/api/cartas", "GET", None, true).await.unwrap();

        assert_eq!(second, json!([1]));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_decode_failure() {
        let transport = MockTransport::new(vec![Ok(HttpResponse {
            status: 200,
            body: Bytes::from("not json"),
        })]);
        let client = client_with(transport);

        let result = client.fetch_data("/api/cartas", "GET", None, true).await;
        assert!(matches!(result, Err(FetchError::DecodeFailed(_))));
    }

    #[tokio::test]
    async fn test_mutate_invalidates_matching_cache_entries() {
        let transport = MockTransport::new(vec![
            MockTransport::ok(json!([{"_id": 5}])),
            MockTransport::ok(json!({"updated": true})),
        ]);
        let client = client_with(transport.clone());

        client.fetch_data("/api/colecciones/5", "GET", None, true).await.unwrap();
        assert_eq!(client.cache().len(), 1);

        let body = json!({"nombre": "nueva"});
        client
            .mutate("/api/colecciones/5", "PUT", Some(&body), "5")
            .await
            .unwrap();

        assert!(client.cache().is_empty());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_helpers_prepend_base_url() {
        struct UrlCapture {
            urls: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl Transport for UrlCapture {
            async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
                self.urls.lock().push(request.url.clone());
                Ok(HttpResponse {
                    status: 200,
                    body: Bytes::from("[]"),
                })
            }
        }

        let capture = Arc::new(UrlCapture {
            urls: Mutex::new(Vec::new()),
        });
        let client = ApiClient::new(
            capture.clone(),
            ClientConfig {
                base_url: "https://lore.example.com".to_string(),
            },
            CacheConfig::default(),
        );

        client.collections().await.unwrap();
        client.collection_cards("7").await.unwrap();
        client.card("9").await.unwrap();

        let urls = capture.urls.lock();
        assert_eq!(urls[0], "https://lore.example.com/api/colecciones");
        assert_eq!(urls[1], "https://lore.example.com/api/colecciones/7/cartas");
        assert_eq!(urls[2], "https://lore.example.com/api/cartas/9");
    }
}
