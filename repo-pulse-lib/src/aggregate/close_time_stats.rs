//! Statistics over issue close durations.
//!
//! Percentiles interpolate linearly between the two closest ranks, with the rank of
//! percentile `p` over `n` sorted samples at `p / 100 * (n - 1)`.

use crate::metrics::IssueCloseTimeRecord;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fewest close-time records for which a quarterly trend is produced.
pub const MIN_TREND_SAMPLES: usize = 20;

/// Summary of close durations, in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseTimeStats {
    pub count: u64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Close durations of the issues closed in one calendar quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyCloseTime {
    /// `YYYY-Qn`, from the UTC close instant.
    pub quarter: String,
    pub count: u64,
    pub mean_days: f64,
    pub median_days: f64,
}

/// `None` when there are no records.
#[must_use]
pub fn close_time_stats(records: &[IssueCloseTimeRecord]) -> Option<CloseTimeStats> {
    let sorted = sorted_days(records.iter().map(|r| r.close_days));
    let (&min, &max) = (sorted.first()?, sorted.last()?);

    Some(CloseTimeStats {
        count: sorted.len() as u64,
        mean: mean(&sorted),
        median: percentile(&sorted, 50.0),
        min,
        max,
        p25: percentile(&sorted, 25.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
    })
}

/// Per-quarter close durations, oldest quarter first.
///
/// `None` when fewer than [`MIN_TREND_SAMPLES`] records are available.
#[must_use]
pub fn close_time_trend(records: &[IssueCloseTimeRecord]) -> Option<Vec<QuarterlyCloseTime>> {
    if records.len() < MIN_TREND_SAMPLES {
        return None;
    }

    let mut by_quarter: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for record in records {
        let closed = record.closed_at;
        by_quarter
            .entry((closed.year(), closed.month0() / 3 + 1))
            .or_default()
            .push(record.close_days);
    }

    Some(
        by_quarter
            .into_iter()
            .map(|((year, quarter), days)| {
                let sorted = sorted_days(days.into_iter());
                QuarterlyCloseTime {
                    quarter: format!("{year}-Q{quarter}"),
                    count: sorted.len() as u64,
                    mean_days: mean(&sorted),
                    median_days: percentile(&sorted, 50.0),
                }
            })
            .collect(),
    )
}

fn sorted_days(days: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = days.filter(|d| d.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[expect(clippy::cast_precision_loss, reason = "sample count fits in f64")]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    let Some(last) = sorted_data.len().checked_sub(1) else {
        return 0.0;
    };

    #[expect(clippy::cast_precision_loss, reason = "index fits in f64")]
    let rank = percentile.clamp(0.0, 100.0) / 100.0 * last as f64;

    #[expect(clippy::cast_possible_truncation, reason = "rank is within the index range")]
    #[expect(clippy::cast_sign_loss, reason = "rank is non-negative")]
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(last);

    #[expect(clippy::cast_precision_loss, reason = "index fits in f64")]
    let fraction = rank - lower as f64;

    let low = sorted_data.get(lower).copied().unwrap_or_default();
    let high = sorted_data.get(upper).copied().unwrap_or(low);
    low + (high - low) * fraction
}
