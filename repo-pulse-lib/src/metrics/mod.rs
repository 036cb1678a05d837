//! Per-repository metrics derived from fetched records
//!
//! [`process_repo`] turns one [`RepoFetch`](crate::facts::RepoFetch) into a
//! [`ProcessedRepo`]: the repository's [`RepoMetrics`], its [`PullRequestMetrics`] when
//! pull request data is present, and one [`IssueCloseTimeRecord`] per closed issue with a
//! usable close duration.
//!
//! All values are computed eagerly and returned as immutable structures. Durations are
//! measured in fractional days; negative durations are treated as bad source data and
//! dropped with a warning rather than clamped.

mod issue_close_time;
mod processor;
mod pull_request_metrics;
mod repo_metrics;

pub use issue_close_time::{IssueCloseTimeRecord, issue_close_times};
pub use processor::{ProcessedRepo, commit_counts, process_repo};
pub use pull_request_metrics::PullRequestMetrics;
pub use repo_metrics::{CommitCounts, IssueCounts, RepoMetrics};

pub(crate) use repo_metrics::percentage;

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86400.0;

/// Days elapsed from `from` to `to`, negative when `to` precedes `from`.
#[expect(clippy::cast_precision_loss, reason = "acceptable for duration")]
fn duration_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_days() {
        let a = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().to_utc();
        let b = DateTime::parse_from_rfc3339("2024-01-02T12:00:00Z").unwrap().to_utc();
        assert!((duration_days(a, b) - 1.5).abs() < f64::EPSILON);
        assert!((duration_days(b, a) + 1.5).abs() < f64::EPSILON);
    }
}
