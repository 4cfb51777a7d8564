//! # Echo Subcommand
//!
//! Sends a message to the FURS echo endpoint and prints the reply. Exercises
//! the whole connection path (client certificate, server chain, endpoint
//! configuration) without submitting anything fiscal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use furs_client::{BlockingReqwestTransport, ExchangeContext, FursClient, FursConfig, TlsIdentity};

use crate::credentials::CredentialArgs;
use crate::read_file;

/// Arguments for the `furs echo` subcommand.
#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub credential: CredentialArgs,

    /// PEM file with the CA certificate(s) the FURS TLS endpoint chains to.
    /// Repeatable.
    #[arg(long = "ca", value_name = "PEM", required = true)]
    pub ca: Vec<PathBuf>,

    /// Message to echo.
    #[arg(default_value = "furs-cli echo")]
    pub message: String,
}

/// Execute the echo subcommand against the environment selected by `FURS_*`
/// variables.
pub fn run_echo(args: &EchoArgs) -> Result<u8> {
    let config = FursConfig::from_env().context("invalid FURS configuration")?;
    echo_with(&config, args)
}

/// Execute the echo subcommand against `config`.
///
/// Blocking; must not be called from inside an async runtime.
pub fn echo_with(config: &FursConfig, args: &EchoArgs) -> Result<u8> {
    let credential = args
        .credential
        .load(&config.environment.client_certificate_ou)?;

    let identity_pem = read_file(&args.credential.bundle, "key bundle")?;
    let mut roots = Vec::with_capacity(args.ca.len());
    for path in &args.ca {
        roots.push(read_file(path, "CA certificate")?);
    }
    let root_refs: Vec<&[u8]> = roots.iter().map(Vec::as_slice).collect();
    let tls = TlsIdentity::from_pem(&identity_pem, &root_refs)?;
    let transport = BlockingReqwestTransport::new(&tls, config.timeout())?;

    let client = FursClient::new(
        ExchangeContext::from_config(config, Arc::new(credential)),
        transport,
    );

    tracing::info!(url = %config.environment.echo_url, "sending echo");
    let reply = client
        .echo(&args.message)
        .with_context(|| format!("echo to {} failed", config.environment.echo_url))?;
    if reply != args.message {
        bail!("echo reply {reply:?} does not match the message sent");
    }

    println!("OK: {reply}");
    Ok(0)
}
