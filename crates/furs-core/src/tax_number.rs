//! # Tax Numbers
//!
//! A Slovenian tax number is an 8-digit integer in `[10000000, 99999999]`.
//! Textual input may carry the 2-letter `SI` country prefix (any case);
//! every other 10-character form is rejected rather than guessed at.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const FORMAT_HINT: &str = "must be a number between 10000000 and 99999999";

/// A validated 8-digit tax number. Serialized as a JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaxNumber(u32);

impl TaxNumber {
    pub const MIN: u32 = 10_000_000;
    pub const MAX: u32 = 99_999_999;

    /// # Errors
    ///
    /// [`ValidationError::OutOfRange`] when `value` is not an 8-digit number.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        Self::checked("TaxNumber", i64::from(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    fn checked(field: &'static str, value: i64) -> Result<Self, ValidationError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(ValidationError::OutOfRange {
                field,
                value: value.to_string(),
                min: Self::MIN.to_string(),
                max: Self::MAX.to_string(),
            });
        }
        // Range-checked above, the narrowing is lossless.
        Ok(Self(value as u32))
    }

    fn parse_field(field: &'static str, text: &str) -> Result<Self, ValidationError> {
        let format_error = || ValidationError::Format {
            field,
            reason: FORMAT_HINT.to_string(),
        };

        let digits = if text.chars().count() == 10 {
            let mut chars = text.chars();
            let prefix: String = chars.by_ref().take(2).collect();
            if !prefix.eq_ignore_ascii_case("si") {
                return Err(format_error());
            }
            chars.as_str()
        } else {
            text
        };

        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error());
        }
        let value: i64 = digits.parse().map_err(|_| format_error())?;
        Self::checked(field, value)
    }
}

impl FromStr for TaxNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("TaxNumber", s)
    }
}

impl<'de> Deserialize<'de> for TaxNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u32::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for TaxNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Null-policy-aware tax number validation for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxNumberValidator {
    field: &'static str,
    allow_null: bool,
}

impl TaxNumberValidator {
    pub const fn new(field: &'static str, allow_null: bool) -> Self {
        Self { field, allow_null }
    }

    /// Validate an integer tax number.
    pub fn validate(&self, value: Option<i64>) -> Result<Option<TaxNumber>, ValidationError> {
        match value {
            None => self.absent(),
            Some(v) => TaxNumber::checked(self.field, v).map(Some),
        }
    }

    /// Parse a tax number from text, stripping an optional `SI` prefix.
    /// Empty text is treated like an absent value.
    pub fn convert_from_string(
        &self,
        value: Option<&str>,
    ) -> Result<Option<TaxNumber>, ValidationError> {
        match value {
            None | Some("") => self.absent(),
            Some(text) => TaxNumber::parse_field(self.field, text).map(Some),
        }
    }

    fn absent(&self) -> Result<Option<TaxNumber>, ValidationError> {
        if self.allow_null {
            Ok(None)
        } else {
            Err(ValidationError::Null { field: self.field })
        }
    }
}
