//! # Temporal Types — UTC-Only Upload Timestamps
//!
//! Defines `UploadedAt`, the UTC-only timestamp attached to uploaded files,
//! truncated to microsecond precision.
//!
//! ## Format Invariant
//!
//! The wire format is fixed: `yyyy-mm-ddThh:mm:ss.ffffffZ` — exactly six
//! fractional digits and a literal `Z` suffix. Nothing else is emitted, and
//! the strict parser accepts nothing else. A well-formed RFC 3339 timestamp
//! with an explicit offset (even `+00:00`) is rejected as *non-UTC*; input
//! with no offset information at all is rejected as *naive* — there is no
//! silent conversion that could introduce ambiguity.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::error::PidxError;

/// chrono format string producing the fixed wire form.
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Why a timestamp string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Not a timestamp in the fixed wire pattern (or not a timestamp at all).
    #[error("timestamp {0:?} does not match the required yyyy-mm-ddThh:mm:ss.ffffffZ pattern")]
    Malformed(String),

    /// A valid RFC 3339 timestamp, but with an explicit offset instead of `Z`.
    #[error("timestamp {0:?} carries a non-Z offset; only UTC with literal Z is accepted")]
    NonUtc(String),

    /// A date-time with no offset information; it cannot be unambiguously
    /// expressed in UTC.
    #[error("timestamp {0:?} has no UTC offset information")]
    Naive(String),
}

impl From<TimestampError> for PidxError {
    fn from(err: TimestampError) -> Self {
        PidxError::InvalidTimestamp(err.to_string())
    }
}

fn wire_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}Z$").expect("static regex")
    })
}

/// A UTC-only upload timestamp, truncated to microsecond precision.
///
/// # Construction
///
/// - [`UploadedAt::parse()`] — from the fixed wire format, strict.
/// - [`UploadedAt::parse_lenient()`] — from any offset-bearing RFC 3339
///   string, converted to UTC.
/// - [`UploadedAt::from_utc()`] — from a `DateTime<Utc>`, truncating
///   sub-microsecond components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadedAt(DateTime<Utc>);

impl UploadedAt {
    /// Create from a `chrono::DateTime<Utc>`, truncating to microseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_micros(dt))
    }

    /// Create from an offset-bearing datetime, converting to UTC.
    pub fn from_offset(dt: DateTime<chrono::FixedOffset>) -> Self {
        Self::from_utc(dt.with_timezone(&Utc))
    }

    /// Parse the fixed wire format, strictly.
    ///
    /// # Errors
    ///
    /// - [`TimestampError::NonUtc`] if the input is valid RFC 3339 with an
    ///   explicit offset (including `+00:00`) instead of `Z`.
    /// - [`TimestampError::Malformed`] otherwise — including well-formed
    ///   UTC timestamps with the wrong fractional precision.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        if wire_re().is_match(s) {
            let dt = DateTime::parse_from_rfc3339(s)
                .map_err(|_| TimestampError::Malformed(s.to_string()))?;
            return Ok(Self::from_offset(dt));
        }
        // Diagnose: distinguish a non-UTC offset from a malformed string.
        if DateTime::parse_from_rfc3339(s).is_ok() && !s.ends_with('Z') && !s.ends_with('z') {
            return Err(TimestampError::NonUtc(s.to_string()));
        }
        Err(TimestampError::Malformed(s.to_string()))
    }

    /// Parse any RFC 3339 timestamp with an explicit offset, converting to
    /// UTC and truncating to microseconds.
    ///
    /// # Errors
    ///
    /// - [`TimestampError::Naive`] for date-times with no offset at all.
    /// - [`TimestampError::Malformed`] for anything else unparseable.
    pub fn parse_lenient(s: &str) -> Result<Self, TimestampError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_offset(dt));
        }
        if NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok() {
            return Err(TimestampError::Naive(s.to_string()));
        }
        Err(TimestampError::Malformed(s.to_string()))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render the fixed wire form (e.g. `2022-01-01T00:00:00.000000Z`).
    pub fn to_wire(&self) -> String {
        self.0.format(WIRE_FORMAT).to_string()
    }
}

impl std::fmt::Display for UploadedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for UploadedAt {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UploadedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for UploadedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate a `DateTime<Utc>` to microsecond precision.
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.nanosecond();
    dt.with_nanosecond(nanos - nanos % 1_000).unwrap_or(dt)
}
