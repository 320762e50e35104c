//! Date ranges and creation-timestamp parsing

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::SelectError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of local wall-clock instants
///
/// Parsed from `YYYY-MM-DD` or `YYYY-MM-DD:YYYY-MM-DD`. The end always
/// extends through the last second of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Range covering whole days from `start` through `end`
    ///
    /// `None` if the day after `end` is past the last representable date.
    #[must_use]
    pub fn days(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        let start = start.and_time(NaiveTime::MIN);
        let end = end
            .and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::hours(24))?
            .checked_sub_signed(Duration::seconds(1))?;
        Some(Self { start, end })
    }

    /// Parse `YYYY-MM-DD[:YYYY-MM-DD]`
    ///
    /// # Errors
    /// Returns `SelectError::InvalidDate` if either side is not a valid day.
    pub fn parse(input: &str) -> Result<Self, SelectError> {
        let invalid = || SelectError::InvalidDate(input.to_string());
        let (first, second) = match input.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (input, None),
        };
        let start = NaiveDate::parse_from_str(first.trim(), DAY_FORMAT).map_err(|_| invalid())?;
        let end = match second {
            Some(s) => NaiveDate::parse_from_str(s.trim(), DAY_FORMAT).map_err(|_| invalid())?,
            None => start,
        };
        Self::days(start, end).ok_or_else(invalid)
    }

    /// Whether a UTC instant, viewed in `tz`, falls inside the range
    pub fn contains_in<Tz: TimeZone>(&self, instant: DateTime<Utc>, tz: &Tz) -> bool {
        let local = instant.with_timezone(tz).naive_local();
        local >= self.start && local <= self.end
    }
}

impl FromStr for DateRange {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse a server timestamp as UTC
///
/// The service emits `2019-01-01T10:11:12Z`, `2019-01-01T10:11:12.345` or
/// `2019-01-01T10:11:12`; all are UTC. A full RFC 3339 string with an offset
/// is accepted as well.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}
