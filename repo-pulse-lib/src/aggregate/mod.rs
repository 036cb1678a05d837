//! Cross-repository rollups
//!
//! Everything here is a pure function of the fetched records and the per-repository
//! metrics. Only repositories whose basic info was fetched ever reach this module, so
//! critically failed repositories are absent from every rollup.

mod close_time_stats;
mod commit_activity;
mod contributors;
mod languages;
mod overall;

pub use close_time_stats::{CloseTimeStats, MIN_TREND_SAMPLES, QuarterlyCloseTime, close_time_stats, close_time_trend};
pub use commit_activity::{CommitActivityRow, commit_activity};
pub use contributors::{ContributorSummaryRow, contributor_summary};
pub use languages::{LanguageDistributionRow, UNKNOWN_LANGUAGE, language_distribution};
pub use overall::OverallStats;

use crate::facts::RepoFetch;
use crate::metrics::{IssueCloseTimeRecord, ProcessedRepo, RepoMetrics};

/// All cross-repository rollups of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub contributors: Vec<ContributorSummaryRow>,
    pub commit_activity: Vec<CommitActivityRow>,
    pub languages: Vec<LanguageDistributionRow>,
    pub close_time_stats: Option<CloseTimeStats>,
    pub close_time_trend: Option<Vec<QuarterlyCloseTime>>,
    pub overall: OverallStats,
}

#[must_use]
pub fn aggregate(fetches: &[RepoFetch], processed: &[ProcessedRepo]) -> Aggregates {
    let contributors = contributor_summary(fetches);
    let close_times: Vec<IssueCloseTimeRecord> = processed.iter().flat_map(|p| p.close_times.iter().cloned()).collect();
    let repo_metrics: Vec<RepoMetrics> = processed.iter().map(|p| p.metrics.clone()).collect();

    Aggregates {
        overall: OverallStats::from_repos(processed, contributors.len() as u64),
        commit_activity: commit_activity(fetches),
        languages: language_distribution(&repo_metrics),
        close_time_stats: close_time_stats(&close_times),
        close_time_trend: close_time_trend(&close_times),
        contributors,
    }
}
