//! # furs-cli — FURS Operator Command-Line Interface
//!
//! Small operator tool around the fiscal verification client, for checking
//! a POS installation without running the POS itself.
//!
//! ## Subcommands
//!
//! - `echo` — Round-trip a message through the FURS echo endpoint over
//!   mutual TLS
//! - `zoi` — Compute the protective mark of an invoice offline
//! - `verify-token` — Verify a signed token against a certificate and
//!   print its payload
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here only load inputs
//!   and delegate to the library crates.
//! - Results go to stdout, logs to stderr.
//! - Handlers return `anyhow::Result<u8>`; the `u8` is the process exit code.

pub mod credentials;
pub mod echo;
pub mod verify;
pub mod zoi;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a file into memory, naming the file in the error.
pub(crate) fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {what}: {}", path.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    pub fn path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../furs-crypto/tests/fixtures")
            .join(name)
    }
}
