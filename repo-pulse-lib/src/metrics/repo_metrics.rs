use crate::facts::{BasicInfo, IssueRecord, ItemState, RepoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open and closed issue counts of one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub open: u64,
    pub closed: u64,
}

impl IssueCounts {
    #[must_use]
    pub fn from_issues(issues: &[IssueRecord]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.state {
                ItemState::Open => counts.open += 1,
                ItemState::Closed => counts.closed += 1,
            }
            counts
        })
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.open + self.closed
    }

    /// Closed issues as a percentage of all issues, `None` without issues.
    #[must_use]
    pub fn resolution_rate(&self) -> Option<f64> {
        percentage(self.closed, self.total())
    }
}

/// Commit counts of one repository over the configured history window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitCounts {
    pub total_fetched: u64,
    pub last_30_days: u64,
}

/// Derived metrics for one repository whose basic info was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetrics {
    pub repo_id: RepoId,
    pub full_name: String,
    pub owner: String,
    pub short_name: String,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub open_issues: u64,
    pub closed_issues: u64,
    pub total_issues: u64,

    /// Percentage in `[0, 100]`; `None` when the repository has no issues.
    pub resolution_rate: Option<f64>,

    /// `None` when commit history was disabled or could not be fetched.
    pub total_commits_fetched_period: Option<u64>,
    pub monthly_commits_last30d: Option<u64>,

    /// Whole days since creation.
    pub age_days: u64,
    pub is_fork: bool,
    pub is_archived: bool,
}

impl RepoMetrics {
    #[must_use]
    pub fn new(info: &BasicInfo, issues: IssueCounts, commits: Option<CommitCounts>, now: DateTime<Utc>) -> Self {
        Self {
            repo_id: info.repo_id.clone(),
            full_name: info.full_name.clone(),
            owner: info.owner.clone(),
            short_name: info.short_name.clone(),
            description: info.description.clone(),
            html_url: info.html_url.clone(),
            stars: info.stars,
            forks: info.forks,
            language: info.language.clone(),
            created_at: info.created_at,
            updated_at: info.updated_at,
            pushed_at: info.pushed_at,
            open_issues: issues.open,
            closed_issues: issues.closed,
            total_issues: issues.total(),
            resolution_rate: issues.resolution_rate(),
            total_commits_fetched_period: commits.map(|c| c.total_fetched),
            monthly_commits_last30d: commits.map(|c| c.last_30_days),
            age_days: u64::try_from((now - info.created_at).num_days()).unwrap_or(0),
            is_fork: info.is_fork,
            is_archived: info.is_archived,
        }
    }
}

/// `part / whole` as a percentage, `None` when `whole` is zero.
#[expect(clippy::cast_precision_loss, reason = "counts fit in f64")]
pub(crate) fn percentage(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}
