//! # Wire Documents
//!
//! The JSON documents exchanged with FURS, with their fixed PascalCase field
//! names. Request documents are built through validating constructors and
//! builders; once built they are frozen, so a document that exists is one
//! the server's field definitions accept.
//!
//! Absent optional fields and empty lists are omitted on the wire. Amounts
//! are written as JSON numbers that keep their scale (`100.00`).
//!
//! - [`header`]: the per-message header.
//! - [`invoice`]: invoices, tax breakdowns and reference invoices.
//! - [`premise`]: business premise registration.
//! - [`message`]: the single-key request and response wrappers.

pub mod header;
pub mod invoice;
pub mod message;
pub mod premise;

pub use header::{FursHeader, ResponseHeader};
pub use invoice::{
    FlatRateCompensation, Invoice, InvoiceBuilder, InvoiceIdentifier, InvoiceRequest,
    NumberingStructure, ReferenceInvoice, TaxesPerSeller, Vat,
};
pub use message::{BusinessPremiseResponse, FursRequest, FursResponse, InvoiceResponse, ServerError};
pub use premise::{
    BpIdentifier, BusinessPremise, BusinessPremiseRequest, ClosingTag, PremiseType,
    PropertyAddress, PropertyId, RealEstateBp, SoftwareSupplier,
};
