use super::duration_days;
use crate::diagnostics::Diagnostics;
use crate::facts::{IssueRecord, ItemState, RepoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "   metrics";

/// How long one closed issue stayed open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueCloseTimeRecord {
    pub repo_id: RepoId,
    pub issue_number: u64,

    /// Never negative.
    pub close_days: f64,
    pub closed_at: DateTime<Utc>,
}

/// Close durations of the closed issues that carry both timestamps.
pub fn issue_close_times(repo_id: &RepoId, issues: &[IssueRecord], diagnostics: &Diagnostics) -> Vec<IssueCloseTimeRecord> {
    issues
        .iter()
        .filter(|issue| issue.state == ItemState::Closed)
        .filter_map(|issue| {
            let (created_at, closed_at) = (issue.created_at?, issue.closed_at?);
            let close_days = duration_days(created_at, closed_at);

            if close_days < 0.0 {
                diagnostics.warn(
                    LOG_TARGET,
                    repo_id,
                    format_args!("ignoring issue #{} closed {:.2} days before it was created", issue.number, -close_days),
                );
                return None;
            }

            Some(IssueCloseTimeRecord {
                repo_id: repo_id.clone(),
                issue_number: issue.number,
                close_days,
                closed_at,
            })
        })
        .collect()
}
