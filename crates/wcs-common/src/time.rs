//! Time position handling for coverage temporal domains.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// First and last declared time positions of a coverage, kept as the raw
/// strings the server advertised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimits {
    pub begin: String,
    pub end: String,
}

impl TimeLimits {
    /// Take the first and last entries of a position list.
    pub fn from_positions<S: AsRef<str>>(positions: &[S]) -> Option<Self> {
        let first = positions.first()?;
        let last = positions.last()?;
        Some(Self {
            begin: first.as_ref().to_string(),
            end: last.as_ref().to_string(),
        })
    }

    /// Parse both limits as ISO 8601 instants.
    pub fn to_range(&self) -> Result<TimeRange, TimeParseError> {
        Ok(TimeRange::new(
            parse_time_position(&self.begin)?,
            parse_time_position(&self.end)?,
        ))
    }
}

/// A closed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Parse a `gml:timePosition` value.
///
/// Accepts RFC 3339, a naive datetime (assumed UTC, optional fractional
/// seconds) or a bare date.
pub fn parse_time_position(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.trim_end_matches('Z');
    if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}
