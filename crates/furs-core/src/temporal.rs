//! # Civil Timestamps — Europe/Ljubljana, Seconds Precision
//!
//! Fiscal documents carry a civil (zone-less) date and time interpreted in
//! the regulatory zone, Europe/Ljubljana. [`CivilDateTime`] holds such a
//! value with sub-second precision already discarded.
//!
//! ## Invariants
//!
//! - Sub-seconds are **truncated**, never rounded: `10:00:00.999` is
//!   `10:00:00`.
//! - Absolute instants are converted into the regulatory zone before the
//!   civil fields are taken, so a UTC instant at `08:00Z` in summer becomes
//!   `10:00` civil time.
//! - The wire form is `YYYY-MM-DDTHH:MM:SS` with no zone suffix.
//!
//! The protective-mark input uses a different rendering,
//! `YYYY-MM-DD HH:MM:SS`, built by [`CivilDateTime::fingerprint_form`].

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The zone all civil timestamps are interpreted in.
pub const REGULATORY_ZONE: Tz = chrono_tz::Europe::Ljubljana;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A civil date-time in the regulatory zone, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDateTime(NaiveDateTime);

impl CivilDateTime {
    /// The current civil time in the regulatory zone.
    pub fn now() -> Self {
        Self::from_instant(&Utc::now())
    }

    /// Take a civil value as-is, truncating sub-seconds.
    pub fn from_civil(dt: NaiveDateTime) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Convert an absolute instant into regulatory civil time.
    pub fn from_instant<Z: TimeZone>(instant: &DateTime<Z>) -> Self {
        Self::from_civil(instant.with_timezone(&REGULATORY_ZONE).naive_local())
    }

    /// Parse `YYYY-MM-DDTHH:MM:SS`, tolerating (and truncating) a fraction.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        text.parse::<NaiveDateTime>()
            .map(Self::from_civil)
            .map_err(|e| ValidationError::Format {
                field: "DateTime",
                reason: format!("invalid civil timestamp {text:?}: {e}"),
            })
    }

    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// `YYYY-MM-DDTHH:MM:SS`.
    pub fn to_wire(&self) -> String {
        self.0.format(WIRE_FORMAT).to_string()
    }

    /// `YYYY-MM-DD HH:MM:SS`, the rendering hashed into the protective mark.
    pub fn fingerprint_form(&self) -> String {
        format!(
            "{} {}",
            self.0.date().format("%Y-%m-%d"),
            fingerprint_time_of_day(self.0.time())
        )
    }
}

impl std::fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl Serialize for CivilDateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for CivilDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Render a time of day as exactly eight characters, `HH:MM:SS`.
///
/// The natural ISO rendering drops `:SS` when seconds and nanoseconds are
/// both zero and appends a fraction when nanoseconds are non-zero. The
/// short form is padded with `:00`, the long form cut back to eight
/// characters.
pub fn fingerprint_time_of_day(time: NaiveTime) -> String {
    let mut text = format!("{:02}:{:02}", time.hour(), time.minute());
    let nanos = time.nanosecond() % 1_000_000_000;
    if time.second() > 0 || nanos > 0 {
        text.push_str(&format!(":{:02}", time.second()));
        if nanos > 0 {
            if nanos % 1_000_000 == 0 {
                text.push_str(&format!(".{:03}", nanos / 1_000_000));
            } else if nanos % 1_000 == 0 {
                text.push_str(&format!(".{:06}", nanos / 1_000));
            } else {
                text.push_str(&format!(".{nanos:09}"));
            }
        }
    }

    if text.len() < 8 {
        text.push_str(":00");
    } else {
        text.truncate(8);
    }
    text
}

/// Normalizes required timestamp fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeValidator {
    field: &'static str,
}

impl DateTimeValidator {
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }

    pub fn normalize_civil(
        &self,
        value: Option<NaiveDateTime>,
    ) -> Result<CivilDateTime, ValidationError> {
        value
            .map(CivilDateTime::from_civil)
            .ok_or(ValidationError::Null { field: self.field })
    }

    pub fn normalize_instant<Z: TimeZone>(
        &self,
        value: Option<&DateTime<Z>>,
    ) -> Result<CivilDateTime, ValidationError> {
        value
            .map(CivilDateTime::from_instant)
            .ok_or(ValidationError::Null { field: self.field })
    }
}

/// Truncate to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}
