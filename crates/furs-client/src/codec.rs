//! JSON codec for FURS documents.
//!
//! Built once and shared by reference. The field-name mapping lives on the
//! DTOs; the codec adds the response size limit and maps failures onto
//! [`ProtocolError`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonCodec {
    max_response_bytes: usize,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(crate::config::FursConfig::DEFAULT_MAX_RESPONSE_BYTES)
    }
}

impl JsonCodec {
    pub fn new(max_response_bytes: usize) -> Self {
        Self { max_response_bytes }
    }

    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    pub fn encode<T: Serialize>(&self, value: &T, context: &'static str) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|source| ProtocolError::Json { context, source })
    }

    /// Decode a response body, refusing anything over the size limit.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8], context: &'static str) -> Result<T, ProtocolError> {
        if bytes.len() > self.max_response_bytes {
            return Err(ProtocolError::ResponseTooLarge {
                len: bytes.len(),
                max: self.max_response_bytes,
            });
        }
        serde_json::from_slice(bytes).map_err(|source| ProtocolError::Json { context, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Probe {
        token: String,
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let codec = JsonCodec::default();
        let probe: Probe = codec
            .decode(br#"{"token":"a.b.c","extra":1}"#, "probe")
            .unwrap();
        assert_eq!(probe.token, "a.b.c");
    }

    #[test]
    fn decode_enforces_size_limit() {
        let codec = JsonCodec::new(8);
        let err = codec
            .decode::<Probe>(br#"{"token":"a.b.c"}"#, "probe")
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ResponseTooLarge { len: 17, max: 8 }
        ));
    }

    #[test]
    fn decode_reports_context() {
        let err = JsonCodec::default()
            .decode::<Probe>(b"<html>", "token wrapper")
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid token wrapper JSON"));
    }
}
