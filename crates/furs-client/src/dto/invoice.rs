//! # Invoice Documents
//!
//! An [`Invoice`] is assembled with an [`InvoiceBuilder`]. Each setter
//! validates its field immediately; [`InvoiceBuilder::build`] then checks
//! that every required field is present. The resulting invoice is frozen,
//! except for its protective mark, which is filled in once on submission.
//!
//! ## Invariants
//!
//! - Amounts sit at scale 2. `ReturnsAmount` and the per-seller
//!   sub-amounts collapse zero to absent; everything else keeps `0.00`.
//! - An invoice carries at least one [`TaxesPerSeller`] entry.
//! - An existing `ProtectedID` is never recomputed.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use furs_core::decimal::wire;
use furs_core::{
    BusinessPremiseId, CharClass, CivilDateTime, DateTimeValidator, Decimal, DecimalValidator,
    ElectronicDeviceId, InvoiceNumber, NullPolicy, ProtectedId, StringNullPolicy,
    StringValidator, TaxNumber, TaxNumberValidator, ValidationError,
};
use furs_crypto::{fingerprint, Credential, CryptoError, FingerprintInput, IdentifierParts};
use serde::Serialize;

use crate::dto::header::FursHeader;

const INVOICE_AMOUNT: DecimalValidator = DecimalValidator::amount("InvoiceAmount", NullPolicy::Reject);
const RETURNS_AMOUNT: DecimalValidator =
    DecimalValidator::amount("ReturnsAmount", NullPolicy::ZeroToNull);
const PAYMENT_AMOUNT: DecimalValidator = DecimalValidator::amount("PaymentAmount", NullPolicy::Reject);

const OTHER_TAXES_AMOUNT: DecimalValidator = DecimalValidator::sub_amount("OtherTaxesAmount");
const EXEMPT_VAT_TAXABLE_AMOUNT: DecimalValidator =
    DecimalValidator::sub_amount("ExemptVATTaxableAmount");
const REVERSE_VAT_TAXABLE_AMOUNT: DecimalValidator =
    DecimalValidator::sub_amount("ReverseVATTaxableAmount");
const NONTAXABLE_AMOUNT: DecimalValidator = DecimalValidator::sub_amount("NontaxableAmount");
const SPECIAL_TAX_RULES_AMOUNT: DecimalValidator =
    DecimalValidator::sub_amount("SpecialTaxRulesAmount");

const TAX_RATE: DecimalValidator = DecimalValidator::tax_rate("TaxRate", NullPolicy::Reject);
const TAXABLE_AMOUNT: DecimalValidator = DecimalValidator::amount("TaxableAmount", NullPolicy::Reject);
const TAX_AMOUNT: DecimalValidator = DecimalValidator::amount("TaxAmount", NullPolicy::Reject);

const FLAT_RATE_RATE: DecimalValidator = DecimalValidator::tax_rate("FlatRateRate", NullPolicy::Reject);
const FLAT_RATE_TAXABLE_AMOUNT: DecimalValidator =
    DecimalValidator::amount("FlatRateTaxableAmount", NullPolicy::Reject);
const FLAT_RATE_AMOUNT: DecimalValidator = DecimalValidator::amount("FlatRateAmount", NullPolicy::Reject);

const TAX_NUMBER: TaxNumberValidator = TaxNumberValidator::new("TaxNumber", false);
const OPERATOR_TAX_NUMBER: TaxNumberValidator = TaxNumberValidator::new("OperatorTaxNumber", true);
const SELLER_TAX_NUMBER: TaxNumberValidator = TaxNumberValidator::new("SellerTaxNumber", true);
const ISSUE_DATE_TIME: DateTimeValidator = DateTimeValidator::new("IssueDateTime");
const CUSTOMER_VAT_NUMBER: StringValidator = StringValidator::fixed(
    "CustomerVATNumber",
    1,
    20,
    CharClass::TaxIdCharset,
    StringNullPolicy::Reject,
);

/// How invoice numbers are allocated: across the premise or per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberingStructure {
    #[serde(rename = "C")]
    Centrally,
    #[serde(rename = "B")]
    PerDevice,
}

/// Premise, device and sequence number of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InvoiceIdentifier {
    #[serde(rename = "BusinessPremiseID")]
    pub business_premise_id: BusinessPremiseId,
    #[serde(rename = "ElectronicDeviceID")]
    pub electronic_device_id: ElectronicDeviceId,
    #[serde(rename = "InvoiceNumber")]
    pub invoice_number: InvoiceNumber,
}

impl InvoiceIdentifier {
    pub fn new(
        business_premise_id: &str,
        electronic_device_id: &str,
        invoice_number: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            business_premise_id: BusinessPremiseId::new(business_premise_id)?,
            electronic_device_id: ElectronicDeviceId::new(electronic_device_id)?,
            invoice_number: InvoiceNumber::new(invoice_number)?,
        })
    }

    fn fingerprint_parts(&self) -> IdentifierParts<'_> {
        IdentifierParts {
            invoice_number: Some(self.invoice_number.as_str()),
            business_premise_id: Some(self.business_premise_id.as_str()),
            electronic_device_id: Some(self.electronic_device_id.as_str()),
        }
    }
}

/// One VAT line: rate, taxable base and tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vat {
    #[serde(rename = "TaxRate", with = "wire")]
    tax_rate: Decimal,
    #[serde(rename = "TaxableAmount", with = "wire")]
    taxable_amount: Decimal,
    #[serde(rename = "TaxAmount", with = "wire")]
    tax_amount: Decimal,
}

impl Vat {
    pub fn new(
        tax_rate: Decimal,
        taxable_amount: Decimal,
        tax_amount: Decimal,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            tax_rate: TAX_RATE.require(tax_rate)?,
            taxable_amount: TAXABLE_AMOUNT.require(taxable_amount)?,
            tax_amount: TAX_AMOUNT.require(tax_amount)?,
        })
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn taxable_amount(&self) -> Decimal {
        self.taxable_amount
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
}

impl Default for Vat {
    fn default() -> Self {
        Self {
            tax_rate: zero(&TAX_RATE),
            taxable_amount: zero(&TAXABLE_AMOUNT),
            tax_amount: zero(&TAX_AMOUNT),
        }
    }
}

/// Flat-rate compensation for agricultural suppliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRateCompensation {
    #[serde(rename = "FlatRateRate", with = "wire")]
    rate: Decimal,
    #[serde(rename = "FlatRateTaxableAmount", with = "wire")]
    taxable_amount: Decimal,
    #[serde(rename = "FlatRateAmount", with = "wire")]
    amount: Decimal,
}

impl FlatRateCompensation {
    pub fn new(rate: Decimal, taxable_amount: Decimal, amount: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            rate: FLAT_RATE_RATE.require(rate)?,
            taxable_amount: FLAT_RATE_TAXABLE_AMOUNT.require(taxable_amount)?,
            amount: FLAT_RATE_AMOUNT.require(amount)?,
        })
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn taxable_amount(&self) -> Decimal {
        self.taxable_amount
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Tax breakdown for one seller on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxesPerSeller {
    #[serde(rename = "SellerTaxNumber", skip_serializing_if = "Option::is_none")]
    seller_tax_number: Option<TaxNumber>,
    #[serde(rename = "VAT", skip_serializing_if = "Vec::is_empty")]
    vat: Vec<Vat>,
    #[serde(rename = "FlatRateCompensation", skip_serializing_if = "Option::is_none")]
    flat_rate_compensation: Option<FlatRateCompensation>,
    #[serde(
        rename = "OtherTaxesAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    other_taxes_amount: Option<Decimal>,
    #[serde(
        rename = "ExemptVATTaxableAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    exempt_vat_taxable_amount: Option<Decimal>,
    #[serde(
        rename = "ReverseVATTaxableAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    reverse_vat_taxable_amount: Option<Decimal>,
    #[serde(
        rename = "NontaxableAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    nontaxable_amount: Option<Decimal>,
    #[serde(
        rename = "SpecialTaxRulesAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    special_tax_rules_amount: Option<Decimal>,
}

impl TaxesPerSeller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seller_tax_number(mut self, tax_number: TaxNumber) -> Self {
        self.seller_tax_number = Some(tax_number);
        self
    }

    /// Accepts `"12345678"` or `"SI12345678"`; empty text clears the field.
    pub fn try_seller_tax_number(mut self, tax_number: &str) -> Result<Self, ValidationError> {
        self.seller_tax_number = SELLER_TAX_NUMBER.convert_from_string(Some(tax_number))?;
        Ok(self)
    }

    pub fn with_vat(mut self, vat: Vat) -> Self {
        self.vat.push(vat);
        self
    }

    pub fn with_flat_rate_compensation(mut self, compensation: FlatRateCompensation) -> Self {
        self.flat_rate_compensation = Some(compensation);
        self
    }

    pub fn try_other_taxes_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.other_taxes_amount = OTHER_TAXES_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn try_exempt_vat_taxable_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.exempt_vat_taxable_amount = EXEMPT_VAT_TAXABLE_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn try_reverse_vat_taxable_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.reverse_vat_taxable_amount = REVERSE_VAT_TAXABLE_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn try_nontaxable_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.nontaxable_amount = NONTAXABLE_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn try_special_tax_rules_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.special_tax_rules_amount = SPECIAL_TAX_RULES_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn seller_tax_number(&self) -> Option<TaxNumber> {
        self.seller_tax_number
    }

    pub fn vat(&self) -> &[Vat] {
        &self.vat
    }

    pub fn flat_rate_compensation(&self) -> Option<&FlatRateCompensation> {
        self.flat_rate_compensation.as_ref()
    }

    pub fn other_taxes_amount(&self) -> Option<Decimal> {
        self.other_taxes_amount
    }

    pub fn exempt_vat_taxable_amount(&self) -> Option<Decimal> {
        self.exempt_vat_taxable_amount
    }

    pub fn reverse_vat_taxable_amount(&self) -> Option<Decimal> {
        self.reverse_vat_taxable_amount
    }

    pub fn nontaxable_amount(&self) -> Option<Decimal> {
        self.nontaxable_amount
    }

    pub fn special_tax_rules_amount(&self) -> Option<Decimal> {
        self.special_tax_rules_amount
    }
}

/// An earlier invoice that this one corrects or cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceInvoice {
    #[serde(rename = "ReferenceInvoiceIdentifier")]
    pub identifier: InvoiceIdentifier,
    #[serde(rename = "ReferenceInvoiceIssueDateTime")]
    pub issue_date_time: CivilDateTime,
}

impl ReferenceInvoice {
    pub fn new(identifier: InvoiceIdentifier, issue_date_time: CivilDateTime) -> Self {
        Self {
            identifier,
            issue_date_time,
        }
    }
}

/// A fiscal invoice, ready for submission once it carries a protective mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    #[serde(rename = "TaxNumber")]
    tax_number: TaxNumber,
    #[serde(rename = "IssueDateTime")]
    issue_date_time: CivilDateTime,
    #[serde(rename = "NumberingStructure")]
    numbering_structure: NumberingStructure,
    #[serde(rename = "InvoiceIdentifier")]
    invoice_identifier: InvoiceIdentifier,
    #[serde(rename = "CustomerVATNumber", skip_serializing_if = "Option::is_none")]
    customer_vat_number: Option<String>,
    #[serde(rename = "InvoiceAmount", with = "wire")]
    invoice_amount: Decimal,
    #[serde(
        rename = "ReturnsAmount",
        with = "wire::option",
        skip_serializing_if = "Option::is_none"
    )]
    returns_amount: Option<Decimal>,
    #[serde(rename = "PaymentAmount", with = "wire")]
    payment_amount: Decimal,
    #[serde(rename = "TaxesPerSeller")]
    taxes_per_seller: Vec<TaxesPerSeller>,
    #[serde(rename = "OperatorTaxNumber", skip_serializing_if = "Option::is_none")]
    operator_tax_number: Option<TaxNumber>,
    #[serde(rename = "ForeignOperator", skip_serializing_if = "Option::is_none")]
    foreign_operator: Option<bool>,
    #[serde(rename = "ProtectedID", skip_serializing_if = "Option::is_none")]
    protected_id: Option<ProtectedId>,
    #[serde(rename = "SubsequentSubmit", skip_serializing_if = "Option::is_none")]
    subsequent_submit: Option<bool>,
    #[serde(rename = "ReferenceInvoice", skip_serializing_if = "Vec::is_empty")]
    reference_invoices: Vec<ReferenceInvoice>,
}

impl Invoice {
    pub fn builder() -> InvoiceBuilder {
        InvoiceBuilder::default()
    }

    pub fn tax_number(&self) -> TaxNumber {
        self.tax_number
    }

    pub fn issue_date_time(&self) -> CivilDateTime {
        self.issue_date_time
    }

    pub fn numbering_structure(&self) -> NumberingStructure {
        self.numbering_structure
    }

    pub fn invoice_identifier(&self) -> &InvoiceIdentifier {
        &self.invoice_identifier
    }

    pub fn customer_vat_number(&self) -> Option<&str> {
        self.customer_vat_number.as_deref()
    }

    pub fn invoice_amount(&self) -> Decimal {
        self.invoice_amount
    }

    pub fn returns_amount(&self) -> Option<Decimal> {
        self.returns_amount
    }

    pub fn payment_amount(&self) -> Decimal {
        self.payment_amount
    }

    pub fn taxes_per_seller(&self) -> &[TaxesPerSeller] {
        &self.taxes_per_seller
    }

    pub fn operator_tax_number(&self) -> Option<TaxNumber> {
        self.operator_tax_number
    }

    pub fn foreign_operator(&self) -> Option<bool> {
        self.foreign_operator
    }

    pub fn protected_id(&self) -> Option<&ProtectedId> {
        self.protected_id.as_ref()
    }

    pub fn subsequent_submit(&self) -> Option<bool> {
        self.subsequent_submit
    }

    pub fn reference_invoices(&self) -> &[ReferenceInvoice] {
        &self.reference_invoices
    }

    /// Restore a mark computed earlier, e.g. the one printed on the receipt
    /// of an invoice that is now being submitted late.
    pub fn with_protected_id(mut self, protected_id: ProtectedId) -> Self {
        self.protected_id = Some(protected_id);
        self
    }

    /// The fields that enter the protective mark.
    pub fn fingerprint_input(&self) -> FingerprintInput<'_> {
        FingerprintInput {
            tax_number: Some(self.tax_number),
            issue_date_time: Some(self.issue_date_time),
            invoice_identifier: Some(self.invoice_identifier.fingerprint_parts()),
            invoice_amount: Some(self.invoice_amount),
        }
    }

    /// Compute the protective mark unless one is already present.
    pub fn ensure_protected_id(&mut self, credential: &Credential) -> Result<&ProtectedId, CryptoError> {
        let protected_id = match self.protected_id.take() {
            Some(existing) => existing,
            None => fingerprint::compute(&self.fingerprint_input(), credential)?,
        };
        Ok(self.protected_id.insert(protected_id))
    }
}

/// Field-by-field construction of an [`Invoice`].
#[derive(Debug, Clone, Default)]
pub struct InvoiceBuilder {
    tax_number: Option<TaxNumber>,
    issue_date_time: Option<CivilDateTime>,
    numbering_structure: Option<NumberingStructure>,
    invoice_identifier: Option<InvoiceIdentifier>,
    customer_vat_number: Option<String>,
    invoice_amount: Option<Decimal>,
    returns_amount: Option<Decimal>,
    payment_amount: Option<Decimal>,
    taxes_per_seller: Vec<TaxesPerSeller>,
    operator_tax_number: Option<TaxNumber>,
    foreign_operator: Option<bool>,
    protected_id: Option<ProtectedId>,
    subsequent_submit: Option<bool>,
    reference_invoices: Vec<ReferenceInvoice>,
}

impl InvoiceBuilder {
    pub fn tax_number(mut self, tax_number: TaxNumber) -> Self {
        self.tax_number = Some(tax_number);
        self
    }

    /// Accepts `"12345678"` or `"SI12345678"`.
    pub fn try_tax_number(mut self, tax_number: &str) -> Result<Self, ValidationError> {
        self.tax_number = TAX_NUMBER.convert_from_string(Some(tax_number))?;
        Ok(self)
    }

    /// Issue time as Ljubljana civil time; sub-second precision is dropped.
    pub fn issue_date_time(mut self, issued: NaiveDateTime) -> Self {
        self.issue_date_time = Some(CivilDateTime::from_civil(issued));
        self
    }

    /// Issue time as an instant, converted into Ljubljana civil time.
    pub fn issued_at<Z: TimeZone>(mut self, instant: &DateTime<Z>) -> Self {
        self.issue_date_time = Some(CivilDateTime::from_instant(instant));
        self
    }

    pub fn numbering_structure(mut self, numbering: NumberingStructure) -> Self {
        self.numbering_structure = Some(numbering);
        self
    }

    pub fn invoice_identifier(mut self, identifier: InvoiceIdentifier) -> Self {
        self.invoice_identifier = Some(identifier);
        self
    }

    pub fn try_customer_vat_number(mut self, vat_number: &str) -> Result<Self, ValidationError> {
        self.customer_vat_number = Some(CUSTOMER_VAT_NUMBER.require(vat_number)?);
        Ok(self)
    }

    pub fn try_invoice_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.invoice_amount = Some(INVOICE_AMOUNT.require(amount)?);
        Ok(self)
    }

    /// Like [`Self::try_invoice_amount`], rounding half away from zero.
    pub fn try_invoice_amount_f64(mut self, amount: f64) -> Result<Self, ValidationError> {
        self.invoice_amount = INVOICE_AMOUNT.convert_f64(Some(amount))?;
        Ok(self)
    }

    pub fn try_returns_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.returns_amount = RETURNS_AMOUNT.normalize(Some(amount))?;
        Ok(self)
    }

    pub fn try_payment_amount(mut self, amount: Decimal) -> Result<Self, ValidationError> {
        self.payment_amount = Some(PAYMENT_AMOUNT.require(amount)?);
        Ok(self)
    }

    /// Like [`Self::try_payment_amount`], rounding half away from zero.
    pub fn try_payment_amount_f64(mut self, amount: f64) -> Result<Self, ValidationError> {
        self.payment_amount = PAYMENT_AMOUNT.convert_f64(Some(amount))?;
        Ok(self)
    }

    pub fn taxes_per_seller(mut self, taxes: TaxesPerSeller) -> Self {
        self.taxes_per_seller.push(taxes);
        self
    }

    pub fn operator_tax_number(mut self, tax_number: TaxNumber) -> Self {
        self.operator_tax_number = Some(tax_number);
        self
    }

    /// Accepts `"12345678"` or `"SI12345678"`; empty text clears the field.
    pub fn try_operator_tax_number(mut self, tax_number: &str) -> Result<Self, ValidationError> {
        self.operator_tax_number = OPERATOR_TAX_NUMBER.convert_from_string(Some(tax_number))?;
        Ok(self)
    }

    pub fn foreign_operator(mut self, foreign: bool) -> Self {
        self.foreign_operator = Some(foreign);
        self
    }

    pub fn protected_id(mut self, protected_id: ProtectedId) -> Self {
        self.protected_id = Some(protected_id);
        self
    }

    pub fn subsequent_submit(mut self, subsequent: bool) -> Self {
        self.subsequent_submit = Some(subsequent);
        self
    }

    pub fn reference_invoice(mut self, reference: ReferenceInvoice) -> Self {
        self.reference_invoices.push(reference);
        self
    }

    pub fn build(self) -> Result<Invoice, ValidationError> {
        let tax_number = self
            .tax_number
            .ok_or(ValidationError::Null { field: "TaxNumber" })?;
        let issue_date_time = ISSUE_DATE_TIME.normalize_civil(
            self.issue_date_time.map(|t| *t.as_naive()),
        )?;
        let numbering_structure = self
            .numbering_structure
            .ok_or(ValidationError::MissingField {
                field: "NumberingStructure",
            })?;
        let invoice_identifier = self
            .invoice_identifier
            .ok_or(ValidationError::MissingField {
                field: "InvoiceIdentifier",
            })?;
        let invoice_amount = INVOICE_AMOUNT
            .normalize(self.invoice_amount)?
            .ok_or(ValidationError::Null {
                field: "InvoiceAmount",
            })?;
        let payment_amount = PAYMENT_AMOUNT
            .normalize(self.payment_amount)?
            .ok_or(ValidationError::Null {
                field: "PaymentAmount",
            })?;
        if self.taxes_per_seller.is_empty() {
            return Err(ValidationError::EmptyList {
                field: "TaxesPerSeller",
            });
        }

        Ok(Invoice {
            tax_number,
            issue_date_time,
            numbering_structure,
            invoice_identifier,
            customer_vat_number: self.customer_vat_number,
            invoice_amount,
            returns_amount: self.returns_amount,
            payment_amount,
            taxes_per_seller: self.taxes_per_seller,
            operator_tax_number: self.operator_tax_number,
            foreign_operator: self.foreign_operator,
            protected_id: self.protected_id,
            subsequent_submit: self.subsequent_submit,
            reference_invoices: self.reference_invoices,
        })
    }
}

/// The body of an invoice submission. A missing header is filled in when
/// the request is prepared for sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRequest {
    #[serde(rename = "Header", skip_serializing_if = "Option::is_none")]
    pub header: Option<FursHeader>,
    #[serde(rename = "Invoice")]
    pub invoice: Invoice,
}

impl InvoiceRequest {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            header: None,
            invoice,
        }
    }

    pub fn with_header(mut self, header: FursHeader) -> Self {
        self.header = Some(header);
        self
    }
}

fn zero(validator: &DecimalValidator) -> Decimal {
    validator
        .normalized_zero()
        .unwrap_or_else(|| Decimal::new(0, validator.scale()))
}
