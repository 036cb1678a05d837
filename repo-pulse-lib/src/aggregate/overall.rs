use crate::metrics::{ProcessedRepo, percentage};
use serde::{Deserialize, Serialize};

/// Totals across every repository that made it into the metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_repos: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub open_issues: u64,
    pub closed_issues: u64,
    pub total_issues: u64,

    /// Percentage of closed issues; `None` when there are no issues at all.
    pub resolution_rate: Option<f64>,

    pub open_prs: u64,
    pub closed_prs: u64,
    pub merged_prs: u64,
    pub total_prs: u64,
    pub unique_contributors: u64,
    pub total_commits_fetched: u64,
}

impl OverallStats {
    #[must_use]
    pub fn from_repos(repos: &[ProcessedRepo], unique_contributors: u64) -> Self {
        let mut stats = repos.iter().fold(Self::default(), |mut stats, repo| {
            let m = &repo.metrics;
            stats.total_repos += 1;
            stats.total_stars += m.stars;
            stats.total_forks += m.forks;
            stats.open_issues += m.open_issues;
            stats.closed_issues += m.closed_issues;
            stats.total_commits_fetched += m.total_commits_fetched_period.unwrap_or(0);

            if let Some(prs) = &repo.pull_requests {
                stats.open_prs += prs.open_count;
                stats.closed_prs += prs.closed_count;
                stats.merged_prs += prs.merged_count;
            }
            stats
        });

        stats.total_issues = stats.open_issues + stats.closed_issues;
        stats.total_prs = stats.open_prs + stats.closed_prs + stats.merged_prs;
        stats.resolution_rate = percentage(stats.closed_issues, stats.total_issues);
        stats.unique_contributors = unique_contributors;
        stats
    }
}
