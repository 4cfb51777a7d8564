//! # Protective Mark (ZOI)
//!
//! The regulator-mandated tamper-evidence code printed on every receipt:
//!
//! ```text
//! input = taxNumber
//!       + issueDateTime ("YYYY-MM-DD HH:MM:SS")
//!       + invoiceNumber + businessPremiseId + electronicDeviceId
//!       + invoiceAmount (plain decimal, e.g. "100.00")
//! ZOI   = lowercase_hex(MD5(RSA-SHA256-sign(input, privateKey)))
//! ```
//!
//! No separators are inserted. PKCS#1 v1.5 signatures are deterministic, so
//! the same inputs and key always yield the same mark.

use furs_core::{CivilDateTime, Decimal, ProtectedId, TaxNumber, ValidationError};
use md5::{Digest, Md5};

use crate::credential::Credential;
use crate::error::CryptoError;

/// The invoice identifier components that enter the mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentifierParts<'a> {
    pub invoice_number: Option<&'a str>,
    pub business_premise_id: Option<&'a str>,
    pub electronic_device_id: Option<&'a str>,
}

/// The invoice fields that enter the mark. Every field is required;
/// absence is reported in a fixed order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerprintInput<'a> {
    pub tax_number: Option<TaxNumber>,
    pub issue_date_time: Option<CivilDateTime>,
    pub invoice_identifier: Option<IdentifierParts<'a>>,
    pub invoice_amount: Option<Decimal>,
}

impl FingerprintInput<'_> {
    /// The exact string that is signed.
    pub fn signing_input(&self) -> Result<String, ValidationError> {
        let tax_number = required(self.tax_number, "TaxNumber")?;
        let issued = required(self.issue_date_time, "IssueDateTime")?;
        let identifier = required(self.invoice_identifier, "InvoiceIdentifier")?;
        let invoice_number = required(identifier.invoice_number, "InvoiceNumber")?;
        let premise = required(identifier.business_premise_id, "BusinessPremiseID")?;
        let device = required(identifier.electronic_device_id, "ElectronicDeviceID")?;
        let amount = required(self.invoice_amount, "InvoiceAmount")?;

        Ok(format!(
            "{tax_number}{}{invoice_number}{premise}{device}{amount}",
            issued.fingerprint_form()
        ))
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

/// Compute the protective mark of an invoice.
pub fn compute(input: &FingerprintInput<'_>, credential: &Credential) -> Result<ProtectedId, CryptoError> {
    let text = input.signing_input()?;
    let signature = credential.sign(text.as_bytes())?;
    let digest = Md5::digest(&signature);
    Ok(ProtectedId::new(hex::encode(digest))?)
}
