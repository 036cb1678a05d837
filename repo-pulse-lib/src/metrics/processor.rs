use super::{CommitCounts, IssueCloseTimeRecord, IssueCounts, PullRequestMetrics, RepoMetrics, issue_close_times};
use crate::diagnostics::Diagnostics;
use crate::facts::{CommitRecord, RepoFetch};
use chrono::{DateTime, Duration, Utc};

const RECENT_COMMIT_WINDOW_DAYS: i64 = 30;

/// Metrics derived from one repository's fetched records.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRepo {
    pub metrics: RepoMetrics,

    /// `None` when pull requests were disabled or could not be fetched.
    pub pull_requests: Option<PullRequestMetrics>,

    pub close_times: Vec<IssueCloseTimeRecord>,
}

/// Commits fetched, and how many of them fall in the 30 days before `now`.
#[must_use]
pub fn commit_counts(commits: &[CommitRecord], now: DateTime<Utc>) -> CommitCounts {
    let cutoff = now - Duration::days(RECENT_COMMIT_WINDOW_DAYS);

    CommitCounts {
        total_fetched: commits.len() as u64,
        last_30_days: commits.iter().filter(|c| c.primary_date >= cutoff).count() as u64,
    }
}

pub fn process_repo(fetch: &RepoFetch, now: DateTime<Utc>, diagnostics: &Diagnostics) -> ProcessedRepo {
    let repo_id = fetch.repo_id();
    let issues = fetch.issues.as_deref().unwrap_or_default();

    let commits = fetch.commits.as_deref().map(|commits| commit_counts(commits, now));

    ProcessedRepo {
        metrics: RepoMetrics::new(&fetch.basic_info, IssueCounts::from_issues(issues), commits, now),
        pull_requests: fetch
            .pull_requests
            .as_deref()
            .map(|prs| PullRequestMetrics::from_records(repo_id, prs, diagnostics)),
        close_times: issue_close_times(repo_id, issues, diagnostics),
    }
}
