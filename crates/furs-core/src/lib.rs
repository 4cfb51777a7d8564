//! # furs-core — Field Validation for Fiscal Documents
//!
//! The leaf crate of the workspace. It defines the value types and
//! validators that every fiscal document field passes through before it can
//! be serialized, sealed and submitted.
//!
//! ## Key Design Principles
//!
//! 1. **Validation at construction.** Decimal amounts, strings, tax numbers
//!    and timestamps are checked when they are assigned. A document that
//!    exists is a document the server's field definitions accept.
//!
//! 2. **Exact fixed-point amounts.** Amounts use `rust_decimal::Decimal` at
//!    a fixed scale per field. Excess precision is an error, not a rounding
//!    opportunity.
//!
//! 3. **Civil time in one zone.** [`CivilDateTime`] is always
//!    Europe/Ljubljana civil time with whole seconds.
//!
//! 4. **Validators are `const`.** Field validators are plain `Copy` values
//!    built in `const` items, so impossible bounds fail the build.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `furs-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod decimal;
pub mod error;
pub mod identity;
pub mod tax_number;
pub mod temporal;
pub mod text;

pub use decimal::{DecimalValidator, NullPolicy};
pub use error::{BoundsError, ConfigurationError, ValidationError};
pub use identity::{BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, ProtectedId};
pub use tax_number::{TaxNumber, TaxNumberValidator};
pub use temporal::{CivilDateTime, DateTimeValidator, REGULATORY_ZONE};
pub use text::{CharClass, StringNullPolicy, StringValidator};

pub use rust_decimal::Decimal;
