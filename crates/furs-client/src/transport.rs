//! # Transport Seam
//!
//! The exchange hands an [`HttpRequest`] to a transport and gets response
//! bytes back. Mutual TLS, timeouts and status checks belong to the
//! transport; the exchange never retries and never invents a timeout.
//!
//! - [`Transport`] — blocking round trip.
//! - [`AsyncTransport`] — non-blocking round trip.
//! - [`BlockingTransportAdapter`] — runs a [`Transport`] on the tokio
//!   blocking pool so it can back the async client.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

/// One outbound request. Always a `POST` carrying a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub method: reqwest::Method,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub const CONTENT_TYPE: &'static str = "application/json; charset=UTF-8";

    pub fn post_json(url: Url, body: Vec<u8>) -> Self {
        Self {
            url,
            method: reqwest::Method::POST,
            headers: vec![("Content-Type".to_string(), Self::CONTENT_TYPE.to_string())],
            body,
        }
    }
}

/// Errors raised by a transport. Passed through the exchange unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response not read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The transport could not be constructed (TLS material, client build).
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// A blocking round trip running on the runtime's pool panicked or was
    /// cancelled.
    #[error("blocking transport task failed: {0}")]
    Task(String),
}

/// Blocking request/response round trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError>;
}

/// Non-blocking request/response round trip.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        (**self).execute(request)
    }
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for Arc<T> {
    async fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        (**self).execute(request).await
    }
}

/// Adapts a blocking [`Transport`] to [`AsyncTransport`] by running each
/// round trip with `tokio::task::spawn_blocking`.
#[derive(Debug)]
pub struct BlockingTransportAdapter<T> {
    inner: Arc<T>,
}

impl<T> BlockingTransportAdapter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<T> Clone for BlockingTransportAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<T: Transport + 'static> AsyncTransport for BlockingTransportAdapter<T> {
    async fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        tokio::task::spawn_blocking(move || inner.execute(&request))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))?
    }
}
