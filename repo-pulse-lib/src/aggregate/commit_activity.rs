use crate::facts::RepoFetch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitActivityRow {
    /// UTC calendar date of the commits' primary date.
    pub date: NaiveDate,
    pub commits: u64,
}

/// Daily commit counts across repositories, oldest first.
#[must_use]
pub fn commit_activity(fetches: &[RepoFetch]) -> Vec<CommitActivityRow> {
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for commit in fetches.iter().filter_map(|f| f.commits.as_deref()).flatten() {
        *by_day.entry(commit.primary_date.date_naive()).or_default() += 1;
    }

    by_day.into_iter().map(|(date, commits)| CommitActivityRow { date, commits }).collect()
}
