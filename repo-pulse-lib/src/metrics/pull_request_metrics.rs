use super::duration_days;
use crate::diagnostics::Diagnostics;
use crate::facts::{ItemState, PullRequestRecord, RepoId};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "   metrics";

/// Pull request counts and merge latency for one repository.
///
/// Each pull request is counted in exactly one of `open_count`, `merged_count` and
/// `closed_count` (closed without merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestMetrics {
    pub repo_id: RepoId,
    pub open_count: u64,
    pub closed_count: u64,
    pub merged_count: u64,
    pub total_count: u64,

    /// Mean days from creation to merge over merged pull requests with a valid duration.
    pub avg_merge_days: Option<f64>,
}

impl PullRequestMetrics {
    #[must_use]
    pub fn from_records(repo_id: &RepoId, records: &[PullRequestRecord], diagnostics: &Diagnostics) -> Self {
        let mut open_count = 0;
        let mut closed_count = 0;
        let mut merged_count = 0;
        let mut merge_days = Vec::new();

        for pr in records {
            if pr.state == ItemState::Open {
                open_count += 1;
                continue;
            }

            let Some(merged_at) = pr.merged_at else {
                closed_count += 1;
                continue;
            };

            merged_count += 1;

            let Some(created_at) = pr.created_at else {
                log::debug!(target: LOG_TARGET, "{repo_id}: merged pull request #{} has no creation date", pr.number);
                continue;
            };

            let days = duration_days(created_at, merged_at);
            if days < 0.0 {
                diagnostics.warn(
                    LOG_TARGET,
                    repo_id,
                    format_args!("ignoring pull request #{} merged {:.2} days before it was created", pr.number, -days),
                );
            } else {
                merge_days.push(days);
            }
        }

        Self {
            repo_id: repo_id.clone(),
            open_count,
            closed_count,
            merged_count,
            total_count: open_count + closed_count + merged_count,
            avg_merge_days: mean(&merge_days),
        }
    }
}

#[expect(clippy::cast_precision_loss, reason = "sample count fits in f64")]
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().to_utc()
    }

    fn pr(number: u64, state: ItemState, created: Option<&str>, merged: Option<&str>) -> PullRequestRecord {
        PullRequestRecord {
            number,
            state,
            created_at: created.map(ts),
            closed_at: merged.map(ts),
            merged_at: merged.map(ts),
            author: None,
        }
    }

    #[test]
    fn test_classification_and_average() {
        let repo = RepoId::parse("o/r").unwrap();
        let diagnostics = Diagnostics::new();
        let records = vec![
            pr(1, ItemState::Open, Some("2024-01-01T00:00:00Z"), None),
            pr(2, ItemState::Closed, Some("2024-01-01T00:00:00Z"), None),
            pr(3, ItemState::Closed, Some("2024-01-01T00:00:00Z"), Some("2024-01-03T00:00:00Z")),
            pr(4, ItemState::Closed, Some("2024-01-01T00:00:00Z"), Some("2024-01-05T00:00:00Z")),
        ];

        let metrics = PullRequestMetrics::from_records(&repo, &records, &diagnostics);

        assert_eq!(metrics.open_count, 1);
        assert_eq!(metrics.closed_count, 1);
        assert_eq!(metrics.merged_count, 2);
        assert_eq!(metrics.total_count, 4);
        assert_eq!(metrics.avg_merge_days, Some(3.0));
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn test_negative_merge_duration_is_dropped() {
        let repo = RepoId::parse("o/r").unwrap();
        let diagnostics = Diagnostics::new();
        let records = vec![pr(7, ItemState::Closed, Some("2024-01-05T00:00:00Z"), Some("2024-01-01T00:00:00Z"))];

        let metrics = PullRequestMetrics::from_records(&repo, &records, &diagnostics);

        assert_eq!(metrics.merged_count, 1);
        assert_eq!(metrics.avg_merge_days, None);
        assert_eq!(diagnostics.count_at_least(Severity::Warn), 1);
    }

    #[test]
    fn test_no_pull_requests() {
        let repo = RepoId::parse("o/r").unwrap();
        let metrics = PullRequestMetrics::from_records(&repo, &[], &Diagnostics::new());

        assert_eq!(metrics.total_count, 0);
        assert_eq!(metrics.avg_merge_days, None);
    }
}
