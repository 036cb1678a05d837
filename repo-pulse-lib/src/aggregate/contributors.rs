use crate::facts::RepoFetch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorSummaryRow {
    pub login: String,

    /// Commits summed over every repository the login contributed to.
    pub total_commits: u64,

    pub repo_count: u64,
}

/// Contributor totals across repositories, most commits first, ties by login.
#[must_use]
pub fn contributor_summary(fetches: &[RepoFetch]) -> Vec<ContributorSummaryRow> {
    let mut by_login: HashMap<&str, (u64, u64)> = HashMap::new();

    for contributor in fetches.iter().filter_map(|f| f.contributors.as_deref()).flatten() {
        let entry = by_login.entry(contributor.login.as_str()).or_default();
        entry.0 += contributor.contributions;
        entry.1 += 1;
    }

    let mut rows: Vec<_> = by_login
        .into_iter()
        .map(|(login, (total_commits, repo_count))| ContributorSummaryRow {
            login: login.to_string(),
            total_commits,
            repo_count,
        })
        .collect();

    rows.sort_by(|a, b| b.total_commits.cmp(&a.total_commits).then_with(|| a.login.cmp(&b.login)));
    rows
}
