//! # reqwest Transports
//!
//! [`ReqwestTransport`] (async) and [`BlockingReqwestTransport`] speak
//! mutual TLS to FURS: the client presents its certificate chain and key,
//! and the server must chain to one of the configured roots. Built-in web
//! PKI roots are disabled; FURS uses its own CA.
//!
//! Any non-2xx status becomes [`TransportError::Status`] carrying an excerpt
//! of the body. No retries.

use std::time::Duration;

use crate::transport::{AsyncTransport, HttpRequest, Transport, TransportError};

/// Longest body excerpt kept in a status error, in characters.
const BODY_EXCERPT_CHARS: usize = 512;

/// Client certificate chain with key, plus the roots trusted for the server.
#[derive(Clone)]
pub struct TlsIdentity {
    identity: reqwest::Identity,
    roots: Vec<reqwest::Certificate>,
}

impl TlsIdentity {
    /// `identity_pem` holds the private key followed by the certificate
    /// chain, leaf first. Each entry of `root_pems` may hold several
    /// certificates.
    pub fn from_pem(identity_pem: &[u8], root_pems: &[&[u8]]) -> Result<Self, TransportError> {
        let identity = reqwest::Identity::from_pem(identity_pem)
            .map_err(|e| TransportError::Setup(format!("client identity: {e}")))?;
        let mut roots = Vec::new();
        for pem in root_pems {
            let bundle = reqwest::Certificate::from_pem_bundle(pem)
                .map_err(|e| TransportError::Setup(format!("trusted root: {e}")))?;
            roots.extend(bundle);
        }
        if roots.is_empty() {
            return Err(TransportError::Setup("no trusted root certificates".to_string()));
        }
        Ok(Self { identity, roots })
    }
}

impl std::fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsIdentity")
            .field("identity", &"[REDACTED]")
            .field("roots", &self.roots.len())
            .finish()
    }
}

/// Async transport over `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(tls: &TlsIdentity, timeout: Duration) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .identity(tls.identity.clone())
            .timeout(timeout);
        for root in &tls.roots {
            builder = builder.add_root_certificate(root.clone());
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Setup(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client, e.g. one routed through a proxy.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| failed(request, e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| failed(request, e))?;
        checked(request, status, body.to_vec())
    }
}

/// Blocking transport over `reqwest::blocking::Client`.
///
/// Must not be built or dropped inside an async runtime; wrap it in
/// [`crate::BlockingTransportAdapter`] to use it from async code.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    pub fn new(tls: &TlsIdentity, timeout: Duration) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .identity(tls.identity.clone())
            .timeout(timeout);
        for root in &tls.roots {
            builder = builder.add_root_certificate(root.clone());
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Setup(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for BlockingReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| failed(request, e))?;
        let status = response.status();
        let body = response.bytes().map_err(|e| failed(request, e))?;
        checked(request, status, body.to_vec())
    }
}

fn failed(request: &HttpRequest, source: reqwest::Error) -> TransportError {
    TransportError::Request {
        url: request.url.to_string(),
        source: Box::new(source),
    }
}

fn checked(
    request: &HttpRequest,
    status: reqwest::StatusCode,
    body: Vec<u8>,
) -> Result<Vec<u8>, TransportError> {
    if status.is_success() {
        return Ok(body);
    }
    let excerpt: String = String::from_utf8_lossy(&body)
        .chars()
        .take(BODY_EXCERPT_CHARS)
        .collect();
    tracing::warn!(url = %request.url, status = status.as_u16(), "non-success HTTP status");
    Err(TransportError::Status {
        url: request.url.to_string(),
        status: status.as_u16(),
        body: excerpt,
    })
}
