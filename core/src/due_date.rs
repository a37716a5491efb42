use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use crate::error::ValidationError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%MZ",
];

/// Offset timestamps without seconds, which RFC 3339 parsing rejects
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Years that survive the fixed-width ISO-8601 text both backends agree on
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every shape a due date may arrive in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDateInput {
    /// Calendar date, promoted to midnight
    Date(NaiveDate),
    /// Wall-clock timestamp without offset, taken as UTC
    Naive(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    /// ISO-8601 text of any of the above
    Text(String),
}

impl DueDateInput {
    /// Normalize into a UTC timestamp with microsecond precision
    pub fn normalize(self) -> Result<DateTime<Utc>, ValidationError> {
        let timestamp = match self {
            Self::Date(date) => midnight(date),
            Self::Naive(naive) => naive.and_utc(),
            Self::Timestamp(timestamp) => timestamp,
            Self::Text(text) => return parse_due_date(&text),
        };

        normalize_timestamp(timestamp)
    }
}

impl From<NaiveDate> for DueDateInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for DueDateInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<DateTime<Utc>> for DueDateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<String> for DueDateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for DueDateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parse an ISO-8601 date or datetime string.
///
/// Offsets are converted to UTC, offset-less timestamps are taken as UTC and a
/// bare date becomes midnight of that day.
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidDueDate(value.to_string());

    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
        })
        .map(|zoned| zoned.with_timezone(&Utc))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok().map(midnight))
        .ok_or_else(invalid)?;

    normalize_timestamp(parsed).map_err(|_| invalid())
}

/// Truncate to microseconds and reject years outside 0000-9999.
///
/// Every due date is funnelled through here before it reaches a repository.
pub fn normalize_timestamp(timestamp: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    if !STORABLE_YEARS.contains(&timestamp.year()) {
        return Err(ValidationError::InvalidDueDate(timestamp.to_rfc3339()));
    }

    Ok(timestamp.trunc_subsecs(6))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
