//! Cell coercion for the numeric and date-time columns.

use crate::error::{SummaryError, SummaryResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Timestamp layouts carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Naive timestamp layouts, most common first.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Interpret a `Likes` cell as an exact decimal.
///
/// Accepts plain (`12`, `12.5`, `-3`) and scientific (`1.2e3`) notation.
/// An empty or whitespace-only cell is a missing value and yields `None`.
/// Digit separators and non-finite spellings such as `NaN` are rejected.
/// Finite numbers too large for a decimal are an `OutOfRange` error.
pub fn parse_likes(raw: &str, line: u64) -> SummaryResult<Option<Decimal>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let not_numeric = || SummaryError::TypeConversion {
        line,
        value: raw.to_string(),
    };

    if value.contains('_') {
        return Err(not_numeric());
    }

    match Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
        Ok(likes) => Ok(Some(likes)),
        Err(_) => match value.parse::<f64>() {
            Ok(float) if float.is_finite() => Err(SummaryError::OutOfRange {
                line,
                value: raw.to_string(),
            }),
            _ => Err(not_numeric()),
        },
    }
}

/// Extract the calendar date of a `PostTimestamp` cell.
///
/// Timestamps with an offset are truncated in their own offset, not in
/// UTC: `2024-03-05T23:30:00-05:00` is dated 2024-03-05.
pub fn parse_post_date(raw: &str, line: u64) -> SummaryResult<NaiveDate> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.date_naive());
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    Err(SummaryError::DateParse {
        line,
        value: raw.to_string(),
    })
}
