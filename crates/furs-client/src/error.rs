//! FURS client error types.
//!
//! [`FursError`] is the single error returned by every exchange. Each
//! variant maps to a stable short code (see [`FursError::code`]) that POS
//! software can log or print without parsing messages.

use furs_core::{ConfigurationError, ValidationError};
use furs_crypto::{CredentialError, CryptoError};
use thiserror::Error;

use crate::transport::TransportError;

/// Placeholder code used when the server reports an error without one.
pub const UNKNOWN_ERROR_CODE: &str = "????";

/// Malformed wire content from the server.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The token is empty or lacks its separators.
    #[error("malformed token: {0}")]
    TokenFormat(String),

    /// The signature segment is not valid base64url.
    #[error("undecodable token signature: {0}")]
    SignatureDecode(String),

    /// The payload segment is not valid base64url.
    #[error("undecodable token payload: {0}")]
    PayloadDecode(String),

    /// The body (or verified payload) is not the expected JSON.
    #[error("invalid {context} JSON: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The body exceeds the configured size limit.
    #[error("response of {len} bytes exceeds the {max}-byte limit")]
    ResponseTooLarge { len: usize, max: usize },

    /// The response is not of the kind the request calls for.
    #[error("expected {expected}, received {received}")]
    UnexpectedKind {
        expected: &'static str,
        received: &'static str,
    },

    /// The response carries neither a result nor an error.
    #[error("{0}")]
    Incomplete(&'static str),
}

/// Business rejection reported by the server. A missing code becomes
/// [`UNKNOWN_ERROR_CODE`], a missing message the operation's default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code} - {message}")]
pub struct DomainError {
    pub code: String,
    pub message: String,
}

/// Errors from FURS exchanges.
#[derive(Error, Debug)]
pub enum FursError {
    /// Fatal setup mistake.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A document field was rejected before anything was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The server's response is malformed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The response signature does not verify against the trust anchor.
    #[error("security error: {0}")]
    Security(String),

    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected the document.
    #[error("server rejected the request: {0}")]
    Domain(#[from] DomainError),

    /// Key or certificate problem while provisioning or signing.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl FursError {
    /// Stable short code: `C001` validation, `C002` protocol, `C003`
    /// security, `C004` transport, `C005` configuration and credentials.
    /// Domain errors carry the server's own code.
    pub fn code(&self) -> &str {
        match self {
            Self::Validation(_) => "C001",
            Self::Protocol(_) => "C002",
            Self::Security(_) => "C003",
            Self::Transport(_) => "C004",
            Self::Configuration(_) | Self::Credential(_) => "C005",
            Self::Domain(e) => &e.code,
        }
    }
}

impl From<CryptoError> for FursError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::TokenFormat(m) => ProtocolError::TokenFormat(m).into(),
            CryptoError::SignatureDecode(m) => ProtocolError::SignatureDecode(m).into(),
            CryptoError::PayloadDecode(m) => ProtocolError::PayloadDecode(m).into(),
            CryptoError::SignatureInvalid => {
                Self::Security(CryptoError::SignatureInvalid.to_string())
            }
            CryptoError::Validation(e) => Self::Validation(e),
            CryptoError::HeaderEncoding(e) => {
                Self::Credential(CredentialError::Serial(e.to_string()))
            }
            CryptoError::Signing(m) => Self::Credential(CredentialError::PrivateKey(m)),
        }
    }
}
