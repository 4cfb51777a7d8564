//! # String Fields
//!
//! Length bounds are counted in characters, not bytes. The character class
//! is checked after the length, and the first offending character is
//! reported with its position.

use crate::error::{BoundsError, ValidationError};

/// Characters a string field admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Anything.
    Any,
    /// `[A-Za-z0-9]`.
    AsciiAlphanumeric,
    /// `[0-9A-Fa-f]`.
    Hex,
    /// Characters permitted in a VAT identifier (ASCII alphanumeric).
    TaxIdCharset,
    /// `[0-9]`.
    Digits,
}

impl CharClass {
    pub fn admits(self, c: char) -> bool {
        match self {
            Self::Any => true,
            Self::AsciiAlphanumeric | Self::TaxIdCharset => c.is_ascii_alphanumeric(),
            Self::Hex => c.is_ascii_hexdigit(),
            Self::Digits => c.is_ascii_digit(),
        }
    }

    /// Human-readable name used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Any => "any character",
            Self::AsciiAlphanumeric => "an ASCII letter or digit",
            Self::Hex => "a hexadecimal digit",
            Self::TaxIdCharset => "a tax identifier character",
            Self::Digits => "a decimal digit",
        }
    }
}

/// Treatment of absent and empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringNullPolicy {
    Reject,
    Allow,
    /// Absent passes through, and `""` becomes absent before any other check.
    EmptyToNull,
}

/// Length and charset enforcement for one string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringValidator {
    field: &'static str,
    min_len: usize,
    max_len: usize,
    class: CharClass,
    nulls: StringNullPolicy,
}

impl StringValidator {
    /// # Errors
    ///
    /// [`BoundsError::Length`] when `min_len > max_len`.
    pub const fn new(
        field: &'static str,
        min_len: usize,
        max_len: usize,
        class: CharClass,
        nulls: StringNullPolicy,
    ) -> Result<Self, BoundsError> {
        if min_len > max_len {
            return Err(BoundsError::Length {
                field,
                min: min_len,
                max: max_len,
            });
        }
        Ok(Self {
            field,
            min_len,
            max_len,
            class,
            nulls,
        })
    }

    /// Like [`new`](Self::new), for bounds known at compile time.
    ///
    /// # Panics
    ///
    /// When `min_len > max_len`. In a `const` item this is a compile error.
    pub const fn fixed(
        field: &'static str,
        min_len: usize,
        max_len: usize,
        class: CharClass,
        nulls: StringNullPolicy,
    ) -> Self {
        match Self::new(field, min_len, max_len, class, nulls) {
            Ok(v) => v,
            Err(_) => panic!("invalid string validator bounds"),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn normalize(&self, value: Option<&str>) -> Result<Option<String>, ValidationError> {
        let Some(value) = value else {
            return match self.nulls {
                StringNullPolicy::Reject => Err(ValidationError::Null { field: self.field }),
                StringNullPolicy::Allow | StringNullPolicy::EmptyToNull => Ok(None),
            };
        };
        if value.is_empty() && self.nulls == StringNullPolicy::EmptyToNull {
            return Ok(None);
        }

        let length = value.chars().count();
        if length < self.min_len || length > self.max_len {
            return Err(ValidationError::Length {
                field: self.field,
                length,
                min: self.min_len,
                max: self.max_len,
            });
        }
        if let Some((position, character)) =
            value.chars().enumerate().find(|(_, c)| !self.class.admits(*c))
        {
            return Err(ValidationError::InvalidCharacter {
                field: self.field,
                character,
                position,
                class: self.class.describe(),
            });
        }
        Ok(Some(value.to_owned()))
    }

    /// Validate a value that must be present after normalization.
    pub fn require(&self, value: &str) -> Result<String, ValidationError> {
        self.normalize(Some(value))?
            .ok_or(ValidationError::Null { field: self.field })
    }
}
