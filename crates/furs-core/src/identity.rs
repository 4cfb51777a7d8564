//! # Document Identifier Newtypes
//!
//! The identifiers that make up an invoice's identity on the wire. Each is
//! validated at construction and at deserialization, so an
//! [`InvoiceNumber`] can never be passed where a [`BusinessPremiseId`] is
//! expected, and neither can hold a value the server would reject.
//!
//! - [`BusinessPremiseId`], [`ElectronicDeviceId`], [`InvoiceNumber`]:
//!   1..20 ASCII letters or digits.
//! - [`ProtectedId`]: the 32-hex-digit protective mark (ZOI).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::text::{CharClass, StringNullPolicy, StringValidator};

/// Deserializes as a plain `String`, then routes through the type's `new()`
/// constructor so that invalid values are rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

const fn alphanumeric_id(field: &'static str) -> StringValidator {
    StringValidator::fixed(
        field,
        1,
        20,
        CharClass::AsciiAlphanumeric,
        StringNullPolicy::Reject,
    )
}

const PREMISE_ID: StringValidator = alphanumeric_id("BusinessPremiseID");
const DEVICE_ID: StringValidator = alphanumeric_id("ElectronicDeviceID");
const INVOICE_NUMBER: StringValidator = alphanumeric_id("InvoiceNumber");
const PROTECTED_ID: StringValidator = StringValidator::fixed(
    "ProtectedID",
    32,
    32,
    CharClass::Hex,
    StringNullPolicy::Reject,
);

/// Identifier of a registered business premise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BusinessPremiseId(String);

impl_validating_deserialize!(BusinessPremiseId);

impl BusinessPremiseId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value: String = value.into();
        PREMISE_ID.require(&value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the electronic device (cash register) within a premise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ElectronicDeviceId(String);

impl_validating_deserialize!(ElectronicDeviceId);

impl ElectronicDeviceId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value: String = value.into();
        DEVICE_ID.require(&value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sequential invoice number within a premise or device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl_validating_deserialize!(InvoiceNumber);

impl InvoiceNumber {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value: String = value.into();
        INVOICE_NUMBER.require(&value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The protective mark of an invoice (ZOI): 32 hexadecimal digits.
///
/// Computed values are lowercase. Values restored by the caller (for
/// example after a crash between computing and submitting) are accepted in
/// either case and kept verbatim, since the mark must not change once
/// printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProtectedId(String);

impl_validating_deserialize!(ProtectedId);

impl ProtectedId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value: String = value.into();
        PROTECTED_ID.require(&value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_display {
    ($($ty:ident),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

impl_display!(BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, ProtectedId);
