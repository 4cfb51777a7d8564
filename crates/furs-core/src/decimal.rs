//! # Fixed-Point Decimal Fields
//!
//! Every monetary amount and tax rate on the wire has a fixed scale and an
//! inclusive range derived from a `(total digits, decimal digits)` pair:
//! `max = 10^total - 1` units at the declared scale, and `min` is either
//! `-max` or zero. [`DecimalValidator`] enforces that shape and hands back a
//! value already rescaled to the canonical scale, so `100` and `100.0` both
//! leave as `100.00`.
//!
//! ## Invariants
//!
//! - A value with more significant fractional digits than the scale is
//!   rejected, never rounded. Trailing zeros beyond the scale do not count.
//! - `normalize(normalize(x)) == normalize(x)` for every accepted `x`.
//! - Under [`NullPolicy::ZeroToNull`] a zero (of any scale or sign) becomes
//!   absent, which is how optional sub-amounts disappear from the payload.
//!
//! The [`wire`] module serializes `Decimal` as a JSON number that keeps its
//! scale (`100.00`), which `serde_json`'s `arbitrary_precision` makes
//! possible.

use rust_decimal::Decimal;

use crate::error::{BoundsError, ValidationError};

/// Treatment of absent values (and, for sub-amounts, of zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullPolicy {
    /// Absent values are a [`ValidationError::Null`].
    Reject,
    /// Absent values pass through as absent.
    Allow,
    /// Absent values pass through, and zero collapses to absent.
    ZeroToNull,
}

/// Scale and range enforcement for one decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValidator {
    field: &'static str,
    scale: u32,
    /// Inclusive bounds in units of `10^-scale`.
    min_units: i64,
    max_units: i64,
    nulls: NullPolicy,
}

impl DecimalValidator {
    /// Build a validator for `total_digits` significant digits of which
    /// `decimal_digits` are fractional.
    ///
    /// # Errors
    ///
    /// [`BoundsError::TotalDigits`] when `total_digits` is outside `[1, 18]`,
    /// [`BoundsError::Scale`] when `decimal_digits >= total_digits`.
    pub const fn new(
        field: &'static str,
        total_digits: u32,
        decimal_digits: u32,
        allow_negative: bool,
        nulls: NullPolicy,
    ) -> Result<Self, BoundsError> {
        if total_digits < 1 || total_digits > 18 {
            return Err(BoundsError::TotalDigits {
                field,
                total: total_digits,
            });
        }
        if decimal_digits >= total_digits {
            return Err(BoundsError::Scale {
                field,
                total: total_digits,
                decimal: decimal_digits,
            });
        }

        let mut max_units: i64 = 1;
        let mut i = 0;
        while i < total_digits {
            max_units *= 10;
            i += 1;
        }
        max_units -= 1;

        Ok(Self {
            field,
            scale: decimal_digits,
            min_units: if allow_negative { -max_units } else { 0 },
            max_units,
            nulls,
        })
    }

    /// Like [`new`](Self::new), for bounds known at compile time.
    ///
    /// # Panics
    ///
    /// On invalid bounds. Used in `const` items, where the panic surfaces as
    /// a compile error.
    pub const fn fixed(
        field: &'static str,
        total_digits: u32,
        decimal_digits: u32,
        allow_negative: bool,
        nulls: NullPolicy,
    ) -> Self {
        match Self::new(field, total_digits, decimal_digits, allow_negative, nulls) {
            Ok(v) => v,
            Err(_) => panic!("invalid decimal validator bounds"),
        }
    }

    /// Monetary amount: 16 digits, 2 decimals, negative allowed.
    pub const fn amount(field: &'static str, nulls: NullPolicy) -> Self {
        Self::fixed(field, 16, 2, true, nulls)
    }

    /// Tax rate in percent: 7 digits, 2 decimals, negative allowed.
    pub const fn tax_rate(field: &'static str, nulls: NullPolicy) -> Self {
        Self::fixed(field, 7, 2, true, nulls)
    }

    /// Per-seller sub-amount: 14 digits, 2 decimals, zero collapses to absent.
    pub const fn sub_amount(field: &'static str) -> Self {
        Self::fixed(field, 14, 2, true, NullPolicy::ZeroToNull)
    }

    /// Non-negative integer with at most `digits` digits.
    pub const fn count(field: &'static str, digits: u32, nulls: NullPolicy) -> Self {
        Self::fixed(field, digits, 0, false, nulls)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Smallest accepted value.
    pub fn min(&self) -> Decimal {
        Decimal::new(self.min_units, self.scale)
    }

    /// Largest accepted value.
    pub fn max(&self) -> Decimal {
        Decimal::new(self.max_units, self.scale)
    }

    /// The canonical zero: `0` at the declared scale, or absent under
    /// [`NullPolicy::ZeroToNull`].
    pub fn normalized_zero(&self) -> Option<Decimal> {
        match self.nulls {
            NullPolicy::ZeroToNull => None,
            NullPolicy::Reject | NullPolicy::Allow => Some(Decimal::new(0, self.scale)),
        }
    }

    /// Validate `value` and return it at the canonical scale.
    pub fn normalize(&self, value: Option<Decimal>) -> Result<Option<Decimal>, ValidationError> {
        let Some(value) = value else {
            return self.absent();
        };
        if value.is_zero() {
            return Ok(self.normalized_zero());
        }
        if value.normalize().scale() > self.scale {
            return Err(ValidationError::Precision {
                field: self.field,
                value: value.to_string(),
                scale: self.scale,
            });
        }
        if value < self.min() || value > self.max() {
            return Err(self.out_of_range(value.to_string()));
        }

        let mut scaled = value;
        scaled.rescale(self.scale);
        Ok(Some(scaled))
    }

    /// Validate a required value: absent input is always [`ValidationError::Null`].
    pub fn require(&self, value: Decimal) -> Result<Decimal, ValidationError> {
        self.normalize(Some(value))?
            .ok_or(ValidationError::Null { field: self.field })
    }

    /// Convert a binary floating-point value, rounding half away from zero
    /// at the declared scale.
    ///
    /// Binary representation matters: `1.005` is stored as
    /// `1.00499999999999989...` and therefore becomes `1.00`.
    pub fn convert_f64(&self, value: Option<f64>) -> Result<Option<Decimal>, ValidationError> {
        let Some(value) = value else {
            return self.absent();
        };
        if value.is_nan() {
            return Err(ValidationError::NotANumber { field: self.field });
        }

        let scaled = (value * 10f64.powi(self.scale as i32)).round();
        if scaled == 0.0 {
            return Ok(self.normalized_zero());
        }
        // Saturating cast: infinities land on i64::MIN/MAX and fail the range check.
        let units = scaled as i64;
        if !scaled.is_finite() || units < self.min_units || units > self.max_units {
            return Err(self.out_of_range(value.to_string()));
        }
        Ok(Some(Decimal::new(units, self.scale)))
    }

    /// Range-check an integer value (for scale-0 fields such as cadastral numbers).
    pub fn check_integer(&self, value: i64) -> Result<i64, ValidationError> {
        self.normalize(Some(Decimal::from(value)))?;
        Ok(value)
    }

    fn absent(&self) -> Result<Option<Decimal>, ValidationError> {
        match self.nulls {
            NullPolicy::Reject => Err(ValidationError::Null { field: self.field }),
            NullPolicy::Allow | NullPolicy::ZeroToNull => Ok(None),
        }
    }

    fn out_of_range(&self, value: String) -> ValidationError {
        ValidationError::OutOfRange {
            field: self.field,
            value,
            min: self.min().to_string(),
            max: self.max().to_string(),
        }
    }
}

/// Serde adapters writing `Decimal` as a scale-preserving JSON number.
///
/// Use with `#[serde(with = "furs_core::decimal::wire")]` or
/// `#[serde(with = "furs_core::decimal::wire::option")]`.
pub mod wire {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let number =
            serde_json::Number::from_str(&value.to_string()).map_err(serde::ser::Error::custom)?;
        number.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        let text = number.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use rust_decimal::Decimal;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Decimal>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Decimal>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapped(#[serde(with = "super")] Decimal);

            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(d)| d))
        }
    }
}
