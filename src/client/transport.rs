//! Transport seam for the fetch wrapper.
//!
//! `Transport` is the boundary between the caching logic and the actual
//! HTTP stack. Production uses [`ReqwestTransport`]; tests substitute
//! hand-written mocks that count calls and simulate failures.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::FetchError;

/// An outgoing JSON request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: &str, url: &str, body: Option<&Value>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.to_string(),
            body: body.cloned(),
        }
    }
}

/// A raw response: status code plus undecoded body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request. Network-level failures map to
    /// [`FetchError::NetworkUnavailable`]; an HTTP error status is not a
    /// transport error and comes back as a normal response.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| FetchError::NetworkUnavailable(format!("invalid method {}", request.method)))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse { status, body })
    }
}
