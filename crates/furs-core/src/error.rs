//! # Error Types — Validation and Configuration Failures
//!
//! Two families of failure are kept strictly apart:
//!
//! - [`ValidationError`] — a caller-correctable problem with a field value.
//!   Always raised before any network activity, so a rejected document never
//!   leaves the device.
//! - [`ConfigurationError`] — a fatal setup mistake (impossible validator
//!   bounds, an unparseable endpoint URL). Retrying with different field
//!   values cannot fix it.
//!
//! Validator bounds problems are reported through the `Copy` type
//! [`BoundsError`] so that validators can be built in `const` items.

use thiserror::Error;

/// A field value was rejected by its validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The field does not accept an absent value.
    #[error("{field} must not be null")]
    Null { field: &'static str },

    /// The value carries more fractional digits than the field's scale.
    /// Values are never rounded silently.
    #[error("{field}: {value} has more than {scale} decimal digits")]
    Precision {
        field: &'static str,
        value: String,
        scale: u32,
    },

    /// The value lies outside the field's inclusive range.
    #[error("{field}: {value} is outside the range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// The string length (in characters) lies outside the field's bounds.
    #[error("{field}: length {length} is outside the range [{min}, {max}]")]
    Length {
        field: &'static str,
        length: usize,
        min: usize,
        max: usize,
    },

    /// A character is not admitted by the field's character class.
    #[error("{field}: character {character:?} at position {position} is not {class}")]
    InvalidCharacter {
        field: &'static str,
        character: char,
        position: usize,
        class: &'static str,
    },

    /// The value does not have the expected textual shape.
    #[error("{field}: {reason}")]
    Format { field: &'static str, reason: String },

    /// A floating-point input was NaN.
    #[error("{field}: NaN is not a number")]
    NotANumber { field: &'static str },

    /// A field required to complete the document was never set.
    #[error("required field {field} is missing")]
    MissingField { field: &'static str },

    /// A list that needs at least one entry was empty.
    #[error("{field} must contain at least one entry")]
    EmptyList { field: &'static str },
}

impl ValidationError {
    /// The name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Null { field }
            | Self::Precision { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Length { field, .. }
            | Self::InvalidCharacter { field, .. }
            | Self::Format { field, .. }
            | Self::NotANumber { field }
            | Self::MissingField { field }
            | Self::EmptyList { field } => field,
        }
    }
}

/// Impossible validator bounds.
///
/// `Copy` so that `Result<Validator, BoundsError>` can be matched inside
/// `const fn` bodies.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsError {
    /// Total digits must lie in `[1, 18]` so every bound fits in an `i64`.
    #[error("{field}: total digits {total} is outside the range [1, 18]")]
    TotalDigits { field: &'static str, total: u32 },

    /// The scale must leave room for at least one integer digit.
    #[error("{field}: decimal digits {decimal} must be below total digits {total}")]
    Scale {
        field: &'static str,
        total: u32,
        decimal: u32,
    },

    /// Minimum length above maximum length.
    #[error("{field}: minimum length {min} exceeds maximum length {max}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

/// Fatal configuration mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A validator was configured with impossible bounds.
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// An endpoint URL could not be parsed.
    #[error("invalid URL for {name}: {reason}")]
    InvalidUrl { name: String, reason: String },

    /// A configuration variable holds an unusable value.
    #[error("invalid value for {name}: {value:?}")]
    InvalidSetting { name: String, value: String },
}
