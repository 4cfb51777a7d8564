//! Property tests for the signed envelope.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use furs_crypto::envelope::{build, parse_and_verify};
use furs_crypto::{Credential, CryptoError, TrustAnchor};
use proptest::prelude::*;

const CLIENT_BUNDLE: &str = include_str!("fixtures/client-bundle.pem");
const CLIENT_CERT: &str = include_str!("fixtures/client.crt.pem");
const SERVER_CERT: &str = include_str!("fixtures/server.crt.pem");

fn credential() -> &'static Credential {
    static CREDENTIAL: OnceLock<Credential> = OnceLock::new();
    CREDENTIAL.get_or_init(|| {
        Credential::from_pem(
            CLIENT_BUNDLE.as_bytes(),
            SERVER_CERT.as_bytes(),
            "DavPotRacTEST",
        )
        .unwrap()
    })
}

fn own_anchor() -> TrustAnchor {
    TrustAnchor::from_certificate_pem(CLIENT_CERT.as_bytes()).unwrap()
}

/// Replace the payload segment of `token` with `payload`, re-encoded.
fn with_payload(token: &str, payload: &[u8]) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(payload),
        parts[2]
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Whatever is sealed comes back out unchanged.
    #[test]
    fn verify_inverts_build(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let token = build(&payload, credential()).unwrap();
        prop_assert_eq!(parse_and_verify(&token, &own_anchor()).unwrap(), payload);
    }
}

#[test]
fn every_single_bit_flip_in_the_payload_is_detected() {
    let payload = br#"{"EchoRequest":"ok"}"#;
    let token = build(payload, credential()).unwrap();
    let anchor = own_anchor();

    for byte in 0..payload.len() {
        for bit in 0..8 {
            let mut tampered = payload.to_vec();
            tampered[byte] ^= 1 << bit;
            let err = parse_and_verify(&with_payload(&token, &tampered), &anchor).unwrap_err();
            assert!(
                matches!(err, CryptoError::SignatureInvalid),
                "byte {byte} bit {bit}: {err:?}"
            );
        }
    }
}

#[test]
fn flipping_a_payload_character_is_detected() {
    let token = build(b"hello world", credential()).unwrap();
    let first_dot = token.find('.').unwrap();
    let mut bytes = token.into_bytes();
    // Toggle bit 0 of the first payload character; stays printable ASCII.
    bytes[first_dot + 1] ^= 1;
    let tampered = String::from_utf8(bytes).unwrap();
    assert!(matches!(
        parse_and_verify(&tampered, &own_anchor()),
        Err(CryptoError::SignatureInvalid)
    ));
}

#[test]
fn server_anchor_does_not_verify_client_tokens() {
    let token = build(b"payload", credential()).unwrap();
    let server = credential().server_anchor().clone();
    assert!(matches!(
        parse_and_verify(&token, &server),
        Err(CryptoError::SignatureInvalid)
    ));
}
