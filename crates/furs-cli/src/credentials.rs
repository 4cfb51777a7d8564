//! Loading the signing credential from PEM files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use furs_crypto::Credential;

use crate::read_file;

/// PEM inputs that make up a [`Credential`].
#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// PEM bundle holding the unencrypted private key and the client
    /// certificate chain.
    #[arg(long, value_name = "PEM")]
    pub bundle: PathBuf,

    /// PEM certificate FURS signs its responses with.
    #[arg(long, value_name = "PEM")]
    pub server_cert: PathBuf,

    /// OU selecting the client certificate in the bundle
    /// (default: the one of the environment chosen by `FURS_ENV`).
    #[arg(long)]
    pub ou: Option<String>,
}

impl CredentialArgs {
    /// Load the credential, selecting the client certificate by `--ou` or,
    /// failing that, by `default_ou`.
    pub fn load(&self, default_ou: &str) -> Result<Credential> {
        let bundle = read_file(&self.bundle, "key bundle")?;
        let server_cert = read_file(&self.server_cert, "server certificate")?;
        let ou = self.ou.as_deref().unwrap_or(default_ou);

        let credential = Credential::from_pem(&bundle, &server_cert, ou)
            .with_context(|| format!("failed to load credential from {}", self.bundle.display()))?;
        tracing::info!(
            subject = credential.identity().subject(),
            serial = credential.identity().serial(),
            "loaded credential"
        );
        Ok(credential)
    }
}
