//! # furs-crypto — Envelope, Protective Mark and Credentials
//!
//! The cryptographic building blocks of the fiscal exchange:
//!
//! - **Signed envelope** ([`envelope`]): the `header.payload.signature`
//!   RS256 token that seals outbound documents and authenticates inbound
//!   responses against a fixed trust anchor.
//! - **Protective mark** ([`fingerprint`]): the per-invoice ZOI, an MD5
//!   digest of an RSA-SHA256 signature over a fixed field concatenation.
//! - **Credential** ([`credential`]): private key, client certificate
//!   identity and server trust anchor, loadable from PEM.
//!
//! ## Crate Policy
//!
//! - Depends only on `furs-core` internally.
//! - No mocking of cryptographic operations in tests. Tests use real RSA
//!   keys and certificates from `tests/fixtures`, and known-answer vectors
//!   produced independently with OpenSSL.
//! - Everything here is a pure function of its inputs and the shared,
//!   immutable [`Credential`]; all types are `Send + Sync`.

pub mod credential;
pub mod envelope;
pub mod error;
pub mod fingerprint;

pub use credential::{CertificateIdentity, Credential, TrustAnchor};
pub use envelope::{EnvelopeHeader, TokenEnvelope};
pub use error::{CredentialError, CryptoError};
pub use fingerprint::{FingerprintInput, IdentifierParts};
