//! # ZOI Subcommand
//!
//! Computes the protective mark of an invoice offline, from the same fields
//! the POS signs. Useful to cross-check a receipt printed by a device.
//!
//! All inputs pass the same validators as an [`furs_client::dto::Invoice`]
//! before anything is signed.

use anyhow::{Context, Result};
use clap::Args;
use furs_client::FursConfig;
use furs_core::{
    BusinessPremiseId, CivilDateTime, Decimal, DecimalValidator, ElectronicDeviceId,
    InvoiceNumber, NullPolicy, TaxNumber,
};
use furs_crypto::{fingerprint, Credential, FingerprintInput, IdentifierParts};

use crate::credentials::CredentialArgs;

const INVOICE_AMOUNT: DecimalValidator =
    DecimalValidator::amount("InvoiceAmount", NullPolicy::Reject);

/// Arguments for the `furs zoi` subcommand.
#[derive(Args, Debug)]
pub struct ZoiArgs {
    #[command(flatten)]
    pub credential: CredentialArgs,

    /// Seller tax number (8 digits).
    #[arg(long)]
    pub tax_number: u32,

    /// Issue time in regulatory civil time, `YYYY-MM-DDTHH:MM:SS`.
    #[arg(long)]
    pub issued: String,

    /// Business premise ID.
    #[arg(long)]
    pub premise: String,

    /// Electronic device ID.
    #[arg(long)]
    pub device: String,

    /// Invoice number.
    #[arg(long)]
    pub number: String,

    /// Invoice amount with at most two decimals, e.g. `100.00`.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,

    /// Also print the signed input string.
    #[arg(long)]
    pub show_input: bool,
}

/// Execute the zoi subcommand.
pub fn run_zoi(args: &ZoiArgs) -> Result<u8> {
    let config = FursConfig::from_env().context("invalid FURS configuration")?;
    let credential = args
        .credential
        .load(&config.environment.client_certificate_ou)?;

    let (zoi, input) = compute(args, &credential)?;
    if args.show_input {
        println!("input: {input}");
    }
    println!("{zoi}");
    Ok(0)
}

/// Validate the invoice fields and return the mark with its signing input.
pub fn compute(args: &ZoiArgs, credential: &Credential) -> Result<(String, String)> {
    let tax_number = TaxNumber::new(args.tax_number)?;
    let issued = CivilDateTime::parse(&args.issued)?;
    let premise = BusinessPremiseId::new(args.premise.as_str())?;
    let device = ElectronicDeviceId::new(args.device.as_str())?;
    let number = InvoiceNumber::new(args.number.as_str())?;
    let amount = INVOICE_AMOUNT.require(args.amount)?;

    let input = FingerprintInput {
        tax_number: Some(tax_number),
        issue_date_time: Some(issued),
        invoice_identifier: Some(IdentifierParts {
            invoice_number: Some(number.as_str()),
            business_premise_id: Some(premise.as_str()),
            electronic_device_id: Some(device.as_str()),
        }),
        invoice_amount: Some(amount),
    };
    let signing_input = input.signing_input()?;
    let zoi = fingerprint::compute(&input, credential)?;
    tracing::debug!(tax_number = tax_number.value(), "computed protective mark");
    Ok((zoi.as_str().to_string(), signing_input))
}
