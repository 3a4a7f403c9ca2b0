//! Grouped aggregation over post records.
//!
//! Every operation makes one pass to build an ordered map from group key to
//! an accumulator and a second pass over the groups to finalize the values.
//! Rows with an empty group key or an empty `Likes` cell are left out of
//! the groups, like a dataframe group-by drops missing values.

use crate::analysis::parse::{parse_likes, parse_post_date};
use crate::error::{SummaryError, SummaryResult};
use crate::models::{AgeGroupSpread, DateAverage, PlatformTypeAverage, PostRecord, RoundingMode};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanAccumulator {
    sum: Decimal,
    count: u64,
}

impl MeanAccumulator {
    /// Add the `Likes` value read from `line`.
    ///
    /// Fails without changing the accumulator when the sum would leave the
    /// decimal range.
    pub fn add(&mut self, value: Decimal, line: u64) -> SummaryResult<()> {
        self.sum = self
            .sum
            .checked_add(value)
            .ok_or_else(|| SummaryError::OutOfRange {
                line,
                value: value.to_string(),
            })?;
        self.count += 1;
        Ok(())
    }

    /// Exact mean, `None` for an empty accumulator.
    pub fn mean(&self) -> Option<Decimal> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / Decimal::from(self.count))
        }
    }
}

/// Build the group index for `records`.
///
/// `key` returns `Ok(None)` for rows that belong to no group.
fn group_means<K, F>(
    records: &[PostRecord],
    label: &str,
    mut key: F,
) -> SummaryResult<BTreeMap<K, MeanAccumulator>>
where
    K: Ord,
    F: FnMut(&PostRecord) -> SummaryResult<Option<K>>,
{
    let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(group) = key(record)? else {
            skipped += 1;
            continue;
        };
        let Some(likes) = parse_likes(&record.likes, record.line)? else {
            skipped += 1;
            continue;
        };
        groups.entry(group).or_default().add(likes, record.line)?;
    }

    if skipped > 0 {
        warn!(
            "{}: skipped {} row(s) with an empty group key or Likes value",
            label, skipped
        );
    }
    debug!("{}: {} group(s) from {} row(s)", label, groups.len(), records.len());

    Ok(groups)
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Mean likes per `(Platform, PostType)`, ascending by platform then type.
pub fn compute_platform_type_averages(
    records: &[PostRecord],
    rounding: RoundingMode,
) -> SummaryResult<Vec<PlatformTypeAverage>> {
    let groups = group_means(records, "platform/type", |record| {
        Ok(non_empty(&record.platform)
            .zip(non_empty(&record.post_type))
            .map(|(platform, post_type)| (platform.to_string(), post_type.to_string())))
    })?;

    Ok(groups
        .into_iter()
        .filter_map(|((platform, post_type), acc)| {
            acc.mean().map(|mean| PlatformTypeAverage {
                platform,
                post_type,
                avg_likes: rounding.round(mean),
            })
        })
        .collect())
}

/// Mean likes per calendar date of `PostTimestamp`, ascending by date.
pub fn compute_date_averages(
    records: &[PostRecord],
    rounding: RoundingMode,
) -> SummaryResult<Vec<DateAverage>> {
    let groups = group_means(records, "date", |record| {
        match non_empty(record.post_timestamp.trim()) {
            Some(raw) => parse_post_date(raw, record.line).map(Some),
            None => Ok(None),
        }
    })?;

    Ok(groups
        .into_iter()
        .filter_map(|(date, acc)| {
            acc.mean().map(|mean| DateAverage {
                date,
                avg_likes: rounding.round(mean),
            })
        })
        .collect())
}

/// Five-number summary of likes per `AgeGroup`, ascending by age group.
///
/// Quartiles interpolate linearly between the closest ranks at
/// `h = (n - 1) * p`.
pub fn compute_age_group_spread(
    records: &[PostRecord],
    rounding: RoundingMode,
) -> SummaryResult<Vec<AgeGroupSpread>> {
    let mut groups: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(ref age_group) = record.age_group else {
            return Err(SummaryError::Schema {
                missing: vec![crate::dataset::AGE_GROUP_COLUMN.to_string()],
            });
        };
        if age_group.is_empty() {
            skipped += 1;
            continue;
        }
        let Some(likes) = parse_likes(&record.likes, record.line)? else {
            skipped += 1;
            continue;
        };
        groups.entry(age_group.clone()).or_default().push(likes);
    }

    if skipped > 0 {
        warn!(
            "age group: skipped {} row(s) with an empty group key or Likes value",
            skipped
        );
    }

    Ok(groups
        .into_iter()
        .filter_map(|(age_group, mut values)| {
            values.sort();
            let (first, last) = (*values.first()?, *values.last()?);
            Some(AgeGroupSpread {
                age_group,
                min: rounding.round(first),
                q1: rounding.round(quartile(&values, 1)),
                median: rounding.round(quartile(&values, 2)),
                q3: rounding.round(quartile(&values, 3)),
                max: rounding.round(last),
            })
        })
        .collect())
}

/// The `k`-th quartile (k in 1..=3) of a sorted, non-empty slice.
///
/// Written as a weighted sum of the neighbours so no intermediate value
/// exceeds the larger of the two in magnitude.
fn quartile(sorted: &[Decimal], k: usize) -> Decimal {
    let scaled = (sorted.len() - 1) * k;
    let (index, rem) = (scaled / 4, scaled % 4);
    let lower = sorted[index];

    if rem == 0 {
        return lower;
    }

    let upper = sorted[index + 1];
    let weight = Decimal::from(rem) / Decimal::from(4);
    lower * (Decimal::ONE - weight) + upper * weight
}
