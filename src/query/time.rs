//! Time-travel bound normalization.
//!
//! Every accepted bound form converts to a single representation: integer
//! milliseconds since the Unix epoch. Text bounds are interpreted in UTC so
//! the same query serializes to the same window on every host.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{QueryError, QueryResult};

/// An accepted time-travel bound.
///
/// Text bounds use one of four layouts, from coarsest to finest:
/// `YYYY-MM-DD`, `YYYY-MM-DD HH`, `YYYY-MM-DD HH:MM`,
/// `YYYY-MM-DD HH:MM:SS`. Missing components default to zero.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// Milliseconds since the Unix epoch, passed through unchanged.
    Millis(i64),
    /// An explicit UTC instant.
    DateTime(DateTime<Utc>),
    /// A calendar date, taken at midnight UTC.
    Date(NaiveDate),
    /// A textual bound in one of the accepted layouts.
    Text(String),
}

impl EventTime {
    /// Normalize the bound to milliseconds since the Unix epoch.
    pub fn to_epoch_millis(&self) -> QueryResult<i64> {
        match self {
            EventTime::Millis(millis) => Ok(*millis),
            EventTime::DateTime(instant) => Ok(instant.timestamp_millis()),
            EventTime::Date(date) => Ok(midnight_utc(*date).timestamp_millis()),
            EventTime::Text(text) => parse_text(text),
        }
    }
}

impl From<i64> for EventTime {
    fn from(millis: i64) -> Self {
        EventTime::Millis(millis)
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(instant: DateTime<Utc>) -> Self {
        EventTime::DateTime(instant)
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        EventTime::Date(date)
    }
}

impl From<&str> for EventTime {
    fn from(text: &str) -> Self {
        EventTime::Text(text.to_owned())
    }
}

impl From<String> for EventTime {
    fn from(text: String) -> Self {
        EventTime::Text(text)
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    // and_hms_opt(0, 0, 0) is always valid
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&naive)
}

fn parse_text(text: &str) -> QueryResult<i64> {
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }

    // chrono refuses an hour without minutes, so the hour-only layout is
    // split by hand.
    if let Some((date_part, hour_part)) = text.split_once(' ') {
        if !hour_part.contains(':') {
            if let (Ok(date), Ok(hour)) = (
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d"),
                hour_part.parse::<u32>(),
            ) {
                if let Some(naive) = date.and_hms_opt(hour, 0, 0) {
                    return Ok(Utc.from_utc_datetime(&naive).timestamp_millis());
                }
            }
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(midnight_utc(date).timestamp_millis());
    }

    Err(QueryError::InvalidEventTime(text.to_owned()))
}
