use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The optional per-repository resources, fetched after basic info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Issues,
    Contributors,
    Commits,
    PullRequests,
}

/// How completely a repository could be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success,

    /// The repository is excluded from all output.
    CriticalFailure { reason: String },

    /// Basic info was fetched; the listed resources are absent.
    PartialFailure { missing: BTreeSet<ResourceKind> },
}

impl FetchOutcome {
    /// Outcome for a repository whose basic info was fetched.
    #[must_use]
    pub fn from_missing(missing: BTreeSet<ResourceKind>) -> Self {
        if missing.is_empty() {
            Self::Success
        } else {
            Self::PartialFailure { missing }
        }
    }

    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self, Self::CriticalFailure { .. })
    }
}
