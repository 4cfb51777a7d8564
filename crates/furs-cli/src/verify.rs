//! # Token Verification Subcommand
//!
//! Verifies a signed token (for example a captured FURS response) against a
//! certificate and prints the payload. Accepts either the bare
//! `header.payload.signature` text or the `{"token": "..."}` wire wrapper.
//!
//! ## Security Invariant
//!
//! `--header-only` decodes the header without verifying anything; its output
//! is for diagnostics and is labelled as unverified.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use furs_crypto::{envelope, TokenEnvelope, TrustAnchor};

use crate::read_file;

/// Arguments for the `furs verify-token` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// File holding the token or its JSON wrapper.
    #[arg(value_name = "FILE")]
    pub token: PathBuf,

    /// PEM certificate of the signer.
    #[arg(long, value_name = "PEM", required_unless_present = "header_only")]
    pub cert: Option<PathBuf>,

    /// Print the decoded header without verifying the signature.
    #[arg(long)]
    pub header_only: bool,
}

/// Execute the verify-token subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let token = load_token(&args.token)?;

    if args.header_only {
        let header = envelope::peek_header(&token).context("failed to decode token header")?;
        println!("UNVERIFIED header:");
        println!("{}", serde_json::to_string_pretty(&header)?);
        return Ok(0);
    }

    // clap enforces --cert unless --header-only.
    let Some(cert) = &args.cert else {
        anyhow::bail!("--cert is required to verify a token");
    };
    let payload = verify(&token, cert)?;
    println!("OK: signature verified");
    println!("{}", render_payload(&payload));
    Ok(0)
}

/// Verify `token` against the certificate at `cert` and return the payload.
pub fn verify(token: &str, cert: &Path) -> Result<Vec<u8>> {
    let pem = read_file(cert, "certificate")?;
    let anchor = TrustAnchor::from_certificate_pem(&pem)
        .with_context(|| format!("invalid certificate: {}", cert.display()))?;
    let payload = envelope::parse_and_verify(token, &anchor)
        .with_context(|| format!("token does not verify against {}", cert.display()))?;
    tracing::debug!(payload_bytes = payload.len(), "token verified");
    Ok(payload)
}

/// Read a token file, unwrapping the JSON wrapper if present.
pub fn load_token(path: &Path) -> Result<String> {
    let raw = read_file(path, "token")?;
    let text = String::from_utf8(raw)
        .with_context(|| format!("token file is not UTF-8: {}", path.display()))?;
    let text = text.trim();
    if text.starts_with('{') {
        let wrapper: TokenEnvelope = serde_json::from_str(text)
            .with_context(|| format!("invalid token wrapper: {}", path.display()))?;
        return Ok(wrapper.token);
    }
    Ok(text.to_string())
}

/// Pretty JSON when the payload is JSON, lossy text otherwise.
fn render_payload(payload: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(payload).into_owned()),
        Err(_) => String::from_utf8_lossy(payload).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("furs-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn fixture_token_verifies_against_server_certificate() {
        let token = load_token(&fixtures::path("server-signed.token")).unwrap();
        let payload = verify(&token, &fixtures::path("server.crt.pem")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            value["InvoiceResponse"]["UniqueInvoiceID"],
            "7a1d2c3e-4b5f-4a6b-8c7d-9e0f1a2b3c4d"
        );
    }

    #[test]
    fn fixture_token_fails_against_other_certificate() {
        let token = load_token(&fixtures::path("server-signed.token")).unwrap();
        let err = verify(&token, &fixtures::path("client.crt.pem")).unwrap_err();
        assert!(format!("{err:#}").contains("does not verify"));
    }

    #[test]
    fn json_wrapper_is_unwrapped() {
        let bare = load_token(&fixtures::path("server-signed.token")).unwrap();
        let wrapped = serde_json::to_string(&TokenEnvelope { token: bare.clone() }).unwrap();
        let path = temp_file("wrapped.json", &wrapped);
        let loaded = load_token(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), bare);
    }

    #[test]
    fn header_can_be_peeked_without_verification() {
        let token = load_token(&fixtures::path("server-signed.token")).unwrap();
        let header = envelope::peek_header(&token).unwrap();
        assert_eq!(header.alg, "RS256");
        assert!(header.subject_name.contains("blagajne-test.fu.gov.si"));
    }

    #[test]
    fn non_json_payload_renders_as_text() {
        assert_eq!(render_payload(b"plain"), "plain");
        assert!(render_payload(br#"{"a":1}"#).contains("\"a\": 1"));
    }
}
