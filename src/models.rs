//! Data models for the summary pipeline.
//!
//! This module contains the input post record, the derived table rows
//! and the small enums shared between the CLI and the config file.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits kept after the decimal point in every derived value.
pub const DECIMAL_PLACES: u32 = 2;

/// Rounding convention applied to final means and quantiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Ties go to the even neighbour (12.345 -> 12.34)
    #[default]
    HalfEven,
    /// Ties go away from zero (12.345 -> 12.35)
    HalfUp,
}

impl RoundingMode {
    /// Rounds to [`DECIMAL_PLACES`] and fixes the scale so the value always
    /// renders with exactly that many digits.
    pub fn round(self, value: Decimal) -> Decimal {
        let strategy = match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        };
        let mut rounded = value.round_dp_with_strategy(DECIMAL_PLACES, strategy);
        rounded.rescale(DECIMAL_PLACES);
        rounded
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfEven => write!(f, "half-even"),
            RoundingMode::HalfUp => write!(f, "half-up"),
        }
    }
}

/// How table previews are rendered on the console.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    /// Pipe table (default)
    #[default]
    Markdown,
    /// Pretty-printed JSON array
    Json,
}

/// One row of the input table.
///
/// `likes` and `post_timestamp` are kept as the raw cell text; each
/// aggregation coerces them itself so that a bad timestamp only fails the
/// aggregation that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
    pub platform: String,
    pub post_type: String,
    pub likes: String,
    pub post_timestamp: String,
    /// `None` when the input has no `AgeGroup` column.
    pub age_group: Option<String>,
}

/// A row that can be written as a delimited table and previewed.
pub trait SummaryRow: Serialize {
    /// Column names, in output order.
    const HEADERS: &'static [&'static str];

    /// Cell values, in the same order as [`Self::HEADERS`].
    fn fields(&self) -> Vec<String>;
}

/// Mean likes for one `(Platform, PostType)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformTypeAverage {
    pub platform: String,
    pub post_type: String,
    pub avg_likes: Decimal,
}

impl SummaryRow for PlatformTypeAverage {
    const HEADERS: &'static [&'static str] = &["Platform", "PostType", "AvgLikes"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.platform.clone(),
            self.post_type.clone(),
            self.avg_likes.to_string(),
        ]
    }
}

/// Mean likes for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateAverage {
    pub date: NaiveDate,
    pub avg_likes: Decimal,
}

impl SummaryRow for DateAverage {
    const HEADERS: &'static [&'static str] = &["Date", "AvgLikes"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.avg_likes.to_string(),
        ]
    }
}

/// Five-number summary of likes for one age group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeGroupSpread {
    pub age_group: String,
    pub min: Decimal,
    pub q1: Decimal,
    pub median: Decimal,
    pub q3: Decimal,
    pub max: Decimal,
}

impl SummaryRow for AgeGroupSpread {
    const HEADERS: &'static [&'static str] = &["AgeGroup", "Min", "Q1", "Median", "Q3", "Max"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.age_group.clone(),
            self.min.to_string(),
            self.q1.to_string(),
            self.median.to_string(),
            self.q3.to_string(),
            self.max.to_string(),
        ]
    }
}

/// Metadata about one summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Input table that was read.
    pub input: String,
    /// Data rows read from the input.
    pub rows_read: usize,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
    /// Rounding convention used for every derived value.
    pub rounding: RoundingMode,
    /// Whether outputs were skipped.
    pub dry_run: bool,
}

/// One derived table produced by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    /// Short table name (`platform_type`, `date`, `age_group`).
    pub name: String,
    /// Where the table was written; absent on a dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of data rows in the table.
    pub rows: usize,
}

/// Machine-readable record of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub tables: Vec<TableSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rounding_boundary() {
        assert_eq!(RoundingMode::HalfEven.round(dec("12.345")).to_string(), "12.34");
        assert_eq!(RoundingMode::HalfUp.round(dec("12.345")).to_string(), "12.35");
        assert_eq!(RoundingMode::HalfEven.round(dec("12.355")).to_string(), "12.36");
    }

    #[test]
    fn test_rounding_pads_to_two_places() {
        assert_eq!(RoundingMode::HalfEven.round(dec("15")).to_string(), "15.00");
        assert_eq!(RoundingMode::HalfUp.round(dec("0.5")).to_string(), "0.50");
    }

    #[test]
    fn test_rounding_mode_display() {
        assert_eq!(RoundingMode::HalfEven.to_string(), "half-even");
        assert_eq!(RoundingMode::HalfUp.to_string(), "half-up");
    }

    #[test]
    fn test_date_average_fields() {
        let row = DateAverage {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            avg_likes: RoundingMode::HalfEven.round(dec("100")),
        };
        assert_eq!(row.fields(), vec!["2024-03-05", "100.00"]);
        assert_eq!(DateAverage::HEADERS, &["Date", "AvgLikes"]);
    }

    #[test]
    fn test_platform_row_serializes_pascal_case() {
        let row = PlatformTypeAverage {
            platform: "TikTok".to_string(),
            post_type: "Video".to_string(),
            avg_likes: RoundingMode::HalfEven.round(dec("150")),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"Platform":"TikTok","PostType":"Video","AvgLikes":"150.00"}"#
        );
    }
}
