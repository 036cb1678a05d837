use crate::aggregate::{
    CloseTimeStats, CommitActivityRow, ContributorSummaryRow, LanguageDistributionRow, OverallStats, QuarterlyCloseTime,
};
use crate::config::RunConfig;
use crate::diagnostics::Diagnostic;
use crate::facts::{FetchOutcome, RepoId};
use crate::metrics::{IssueCloseTimeRecord, PullRequestMetrics, RepoMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final output of a collection run.
///
/// Built once, after every repository has been fetched and processed, and handed to
/// report writers as a whole. Optional resources may be absent for any repository;
/// [`outcomes`](Self::outcomes) says which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub generated_at: DateTime<Utc>,

    /// Configuration of the run; the token is never included.
    pub config: RunConfig,

    /// One entry per resolved repository, critical failures included.
    pub outcomes: BTreeMap<RepoId, FetchOutcome>,

    /// Targets that could not be expanded, with the reason.
    pub resolution_errors: BTreeMap<String, String>,

    pub repo_metrics: Vec<RepoMetrics>,
    pub pull_request_metrics: Vec<PullRequestMetrics>,
    pub issue_close_times: Vec<IssueCloseTimeRecord>,
    pub close_time_stats: Option<CloseTimeStats>,

    /// Absent when too few close-time records were available.
    pub close_time_trend: Option<Vec<QuarterlyCloseTime>>,

    pub contributors: Vec<ContributorSummaryRow>,
    pub commit_activity: Vec<CommitActivityRow>,
    pub languages: Vec<LanguageDistributionRow>,
    pub overall: OverallStats,
    pub diagnostics: Vec<Diagnostic>,
}
