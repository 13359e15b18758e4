//! Snapshot timestamp parsing and the one-second query window.
//!
//! Callers and the feed supply timestamps in several textual shapes. They
//! are parsed against [`ACCEPTED_FORMATS`] in order; the first format that
//! accepts the input wins. Input is matched as given, without trimming.
//! Offsets are not converted: the wall-clock time as written is what gets
//! stored and queried.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike};

use crate::error::ServiceError;

/// Canonical rendering used in responses and logs.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A textual timestamp layout accepted by [`parse_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// RFC 3339 with a mandatory offset, e.g. `2024-11-08T07:30:11.051Z`.
    /// The date and time are separated by an uppercase `T` and a UTC
    /// offset is an uppercase `Z`.
    Rfc3339,
    /// A `chrono` strftime pattern parsed as a naive date-time.
    Pattern(&'static str),
}

/// Accepted formats in priority order.
pub const ACCEPTED_FORMATS: [TimeFormat; 5] = [
    TimeFormat::Rfc3339,
    TimeFormat::Pattern("%Y-%m-%d %H:%M:%S%.f"),
    TimeFormat::Pattern("%Y-%m-%d %H:%M:%S%.3f"),
    TimeFormat::Pattern("%Y-%m-%d %H:%M:%S%.3fZ"),
    TimeFormat::Pattern("%Y-%m-%d %H:%M:%S%.6f"),
];

impl TimeFormat {
    fn parse(self, input: &str) -> Option<NaiveDateTime> {
        match self {
            Self::Rfc3339 if is_strict_rfc3339(input) => {
                DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.naive_local())
            }
            Self::Rfc3339 => None,
            Self::Pattern(pattern) => NaiveDateTime::parse_from_str(input, pattern).ok(),
        }
    }
}

/// `chrono`'s RFC 3339 parser also takes a space or lowercase `t`/`z`.
fn is_strict_rfc3339(input: &str) -> bool {
    input.as_bytes().get(10) == Some(&b'T') && !input.ends_with('z')
}

/// A parsed snapshot instant, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotInstant {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl SnapshotInstant {
    /// Wraps a date-time, dropping sub-second precision.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TimeFormat`] if the one-second window would
    /// run past the last representable date-time.
    pub fn new(value: NaiveDateTime) -> Result<Self, ServiceError> {
        let start = value.with_nanosecond(0).unwrap_or(value);
        let end = start
            .checked_add_signed(TimeDelta::seconds(1))
            .ok_or_else(|| ServiceError::TimeFormat(start.to_string()))?;
        Ok(Self { start, end })
    }

    /// Inclusive lower bound of the query window.
    #[must_use]
    pub const fn window_start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive upper bound of the query window (`start + 1s`).
    #[must_use]
    pub const fn window_end(&self) -> NaiveDateTime {
        self.end
    }

    /// Returns `true` if `value` falls inside `[start, start + 1s)`.
    #[must_use]
    pub fn contains(&self, value: NaiveDateTime) -> bool {
        value >= self.window_start() && value < self.window_end()
    }

    /// Canonical `YYYY-MM-DD HH:MM:SS` string.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.start.format(CANONICAL_FORMAT).to_string()
    }
}

impl fmt::Display for SnapshotInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format(CANONICAL_FORMAT))
    }
}

/// Parses a timestamp with full precision, trying [`ACCEPTED_FORMATS`] in
/// order.
///
/// # Errors
///
/// Returns [`ServiceError::TimeFormat`] if no format accepts the input.
pub fn parse_precise(input: &str) -> Result<NaiveDateTime, ServiceError> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| format.parse(input))
        .ok_or_else(|| ServiceError::TimeFormat(input.to_string()))
}

/// Parses a caller-supplied timestamp into a [`SnapshotInstant`].
///
/// # Errors
///
/// Returns [`ServiceError::TimeFormat`] if no format accepts the input or
/// the instant has no following second.
pub fn parse_at(input: &str) -> Result<SnapshotInstant, ServiceError> {
    SnapshotInstant::new(parse_precise(input)?)
}
