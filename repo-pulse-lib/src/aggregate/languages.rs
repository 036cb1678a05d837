use crate::metrics::RepoMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label used for repositories without a detected primary language.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDistributionRow {
    pub language: String,
    pub repo_count: u64,
}

/// Repositories per primary language, most common first, ties by label.
#[must_use]
pub fn language_distribution(repos: &[RepoMetrics]) -> Vec<LanguageDistributionRow> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for repo in repos {
        *counts.entry(repo.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE)).or_default() += 1;
    }

    let mut rows: Vec<_> = counts
        .into_iter()
        .map(|(language, repo_count)| LanguageDistributionRow {
            language: language.to_string(),
            repo_count,
        })
        .collect();

    rows.sort_by(|a, b| b.repo_count.cmp(&a.repo_count).then_with(|| a.language.cmp(&b.language)));
    rows
}
