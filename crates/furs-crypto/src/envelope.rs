//! # Signed Envelope — RS256, Three base64url Segments
//!
//! Outbound documents and inbound responses travel as
//! `header.payload.signature`:
//!
//! - `header` — base64url JSON `{"alg":"RS256","subject_name",...,"serial"}`
//!   naming the signer's certificate;
//! - `payload` — base64url of the document bytes;
//! - `signature` — base64url of RSA-SHA256 (PKCS#1 v1.5) over
//!   `header + "." + payload`.
//!
//! The algorithm is fixed. There is no negotiation and no key lookup from the
//! header: [`parse_and_verify`] checks the signature against the
//! pre-configured [`TrustAnchor`] only, whatever the token claims.
//!
//! ## Invariants
//!
//! - Segments are encoded without padding. Decoding accepts padded and
//!   unpadded input.
//! - `parse_and_verify(&build(p, c)?, anchor_of(c)) == p` for every payload,
//!   including the empty one.
//! - Verification happens before the payload segment is decoded, so a
//!   tampered payload is always a [`CryptoError::SignatureInvalid`].

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rsa::pkcs1v15::Signature;
use rsa::signature::Verifier;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::credential::{Credential, TrustAnchor};
use crate::error::CryptoError;

/// The only supported signature algorithm.
pub const ALGORITHM: &str = "RS256";

/// base64url: never pads on encode, accepts either form on decode.
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The JSON header of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub alg: String,
    pub subject_name: String,
    pub issuer_name: String,
    /// Arbitrary-size JSON integer.
    pub serial: serde_json::Number,
}

impl EnvelopeHeader {
    /// The header for envelopes signed with `credential`.
    pub fn for_credential(credential: &Credential) -> Result<Self, CryptoError> {
        let identity = credential.identity();
        Ok(Self {
            alg: ALGORITHM.to_string(),
            subject_name: identity.subject().to_string(),
            issuer_name: identity.issuer().to_string(),
            serial: serde_json::Number::from_str(identity.serial())?,
        })
    }
}

/// The wire wrapper carrying a token: `{"token": "<h>.<p>.<s>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEnvelope {
    pub token: String,
}

/// Seal `payload` into a signed token.
pub fn build(payload: &[u8], credential: &Credential) -> Result<String, CryptoError> {
    let header = serde_json::to_vec(&EnvelopeHeader::for_credential(credential)?)?;

    let mut token = SEGMENT.encode(header);
    token.push('.');
    SEGMENT.encode_string(payload, &mut token);

    let signature = credential.sign(token.as_bytes())?;
    token.push('.');
    SEGMENT.encode_string(signature, &mut token);
    Ok(token)
}

/// Verify `token` against `anchor` and return the raw payload bytes.
pub fn parse_and_verify(token: &str, anchor: &TrustAnchor) -> Result<Vec<u8>, CryptoError> {
    if token.len() < 2 {
        return Err(CryptoError::TokenFormat("token is empty".to_string()));
    }
    let first = token
        .find('.')
        .ok_or_else(|| CryptoError::TokenFormat("missing header separator".to_string()))?;
    let second = token[first + 1..]
        .find('.')
        .map(|i| first + 1 + i)
        .ok_or_else(|| CryptoError::TokenFormat("missing signature separator".to_string()))?;

    let signing_input = &token[..second];
    let signature_bytes = SEGMENT
        .decode(&token[second + 1..])
        .map_err(|e| CryptoError::SignatureDecode(e.to_string()))?;

    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|_| CryptoError::SignatureInvalid)?;
    anchor
        .verifying_key()
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| CryptoError::SignatureInvalid)?;

    SEGMENT
        .decode(&token[first + 1..second])
        .map_err(|e| CryptoError::PayloadDecode(e.to_string()))
}

/// Decode the header of `token` without verifying anything.
///
/// For diagnostics only; never base trust decisions on the result.
pub fn peek_header(token: &str) -> Result<EnvelopeHeader, CryptoError> {
    let segment = token
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CryptoError::TokenFormat("token is empty".to_string()))?;
    let bytes = SEGMENT
        .decode(segment)
        .map_err(|e| CryptoError::TokenFormat(format!("header is not base64url: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}
