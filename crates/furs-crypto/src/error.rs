//! Error types for envelope, fingerprint and credential operations.

use furs_core::ValidationError;
use thiserror::Error;

/// Failure while sealing, opening or fingerprinting.
///
/// Signature *decoding* and signature *verification* are separate variants:
/// the first is a malformed message, the second a message that may have
/// been tampered with.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The token is empty or lacks its two `.` separators.
    #[error("malformed token: {0}")]
    TokenFormat(String),

    /// The signature segment is not valid base64url.
    #[error("token signature is not valid base64url: {0}")]
    SignatureDecode(String),

    /// The signature does not verify against the trusted certificate.
    #[error("token signature does not verify against the trusted server certificate")]
    SignatureInvalid,

    /// The payload segment is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    PayloadDecode(String),

    /// The envelope header could not be encoded.
    #[error("envelope header encoding failed: {0}")]
    HeaderEncoding(#[from] serde_json::Error),

    /// The private key refused to sign.
    #[error("RSA-SHA256 signing failed: {0}")]
    Signing(String),

    /// A fingerprint input field is missing or invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure while provisioning a [`Credential`](crate::Credential).
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The input is not a sequence of PEM blocks.
    #[error("malformed PEM input: {0}")]
    Pem(String),

    /// The bundle must hold exactly one private key.
    #[error("expected exactly one private key in the bundle, found {0}")]
    KeyCount(usize),

    /// Password-protected keys must be decrypted before loading.
    #[error("encrypted private keys are not supported")]
    EncryptedKey,

    /// The key is not a usable RSA private key.
    #[error("invalid RSA private key: {0}")]
    PrivateKey(String),

    /// A certificate could not be parsed.
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// A certificate's subject public key is not RSA.
    #[error("certificate public key is not a usable RSA key: {0}")]
    PublicKey(String),

    /// Zero or several certificates carry the client OU.
    #[error("expected exactly one client certificate with OU={selector}, found {found}")]
    ClientCertificate { selector: String, found: usize },

    /// The selected client certificate belongs to a different key.
    #[error("client certificate does not belong to the private key")]
    KeyMismatch,

    /// The certificate serial is not a decimal integer.
    #[error("certificate serial must be a decimal integer, got {0:?}")]
    Serial(String),
}
