//! Sequential fetch of every resolved repository.
//!
//! Repositories are processed one at a time and, within a repository, resources are
//! fetched in a fixed order: basic info, issues, contributors, commits, pull requests.
//! A failure of basic info excludes the repository; any other failure only leaves that
//! resource absent. A panic while fetching one repository is contained to it.

use super::fetch_outcome::{FetchOutcome, ResourceKind};
use super::progress::Progress;
use super::records::{BasicInfo, CommitRecord, ContributorRecord, IssueRecord, PullRequestRecord};
use super::resources::RepoApi;
use super::{FetchError, RepoId};
use crate::diagnostics::Diagnostics;
use chrono::{DateTime, Utc};
use core::any::Any;
use core::panic::AssertUnwindSafe;
use core::time::Duration;
use futures::FutureExt;
use std::collections::{BTreeMap, BTreeSet};

const LOG_TARGET: &str = "orchestrator";

/// Which optional resources to fetch, and how long to pause between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub call_delay: Duration,
    pub repo_delay: Duration,
    pub fetch_contributors: bool,

    /// Lower bound for the commit listing; `None` disables the commit fetch.
    pub commits_since: Option<DateTime<Utc>>,

    pub fetch_pull_requests: bool,
}

/// Everything that could be fetched for one repository.
///
/// Only built when basic info was obtained. A `None` resource was either disabled or
/// failed; the repository's [`FetchOutcome`] tells which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFetch {
    pub basic_info: BasicInfo,
    pub issues: Option<Vec<IssueRecord>>,
    pub contributors: Option<Vec<ContributorRecord>>,
    pub commits: Option<Vec<CommitRecord>>,
    pub pull_requests: Option<Vec<PullRequestRecord>>,
}

impl RepoFetch {
    #[must_use]
    pub const fn repo_id(&self) -> &RepoId {
        &self.basic_info.repo_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Repositories whose basic info was fetched, in processing order.
    pub repos: Vec<RepoFetch>,

    /// One outcome per processed repository, critical failures included.
    pub outcomes: BTreeMap<RepoId, FetchOutcome>,
}

#[derive(Debug)]
pub struct Orchestrator<'a> {
    api: &'a RepoApi,
    options: FetchOptions,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub const fn new(api: &'a RepoApi, options: FetchOptions) -> Self {
        Self { api, options }
    }

    pub async fn fetch_all(&self, repos: &[RepoId], progress: &dyn Progress, diagnostics: &Diagnostics) -> FetchReport {
        fetch_each(repos, self.options.repo_delay, progress, diagnostics, move |repo| async move {
            self.fetch_repo(&repo, diagnostics).await
        })
        .await
    }

    async fn fetch_repo(&self, repo: &RepoId, diagnostics: &Diagnostics) -> Result<(RepoFetch, BTreeSet<ResourceKind>), FetchError> {
        let basic_info = self.api.basic_info(repo).await?;
        tokio::time::sleep(self.options.call_delay).await;

        let mut missing = BTreeSet::new();

        let issues = self
            .optional(repo, ResourceKind::Issues, self.api.issues(repo, diagnostics).await, &mut missing, diagnostics)
            .await;

        let contributors = if self.options.fetch_contributors {
            let result = self.api.contributors(repo, diagnostics).await;
            self.optional(repo, ResourceKind::Contributors, result, &mut missing, diagnostics).await
        } else {
            None
        };

        let commits = if let Some(since) = self.options.commits_since {
            let result = self.api.commits(repo, since, diagnostics).await;
            self.optional(repo, ResourceKind::Commits, result, &mut missing, diagnostics).await
        } else {
            None
        };

        let pull_requests = if self.options.fetch_pull_requests {
            let result = self.api.pull_requests(repo, diagnostics).await;
            self.optional(repo, ResourceKind::PullRequests, result, &mut missing, diagnostics).await
        } else {
            None
        };

        Ok((
            RepoFetch {
                basic_info,
                issues,
                contributors,
                commits,
                pull_requests,
            },
            missing,
        ))
    }

    async fn optional<T>(
        &self,
        repo: &RepoId,
        kind: ResourceKind,
        result: Result<Vec<T>, FetchError>,
        missing: &mut BTreeSet<ResourceKind>,
        diagnostics: &Diagnostics,
    ) -> Option<Vec<T>> {
        tokio::time::sleep(self.options.call_delay).await;

        match result {
            Ok(items) => {
                log::debug!(target: LOG_TARGET, "{repo}: fetched {} {kind} record(s)", items.len());
                Some(items)
            }
            Err(e) => {
                diagnostics.fetch_failed(LOG_TARGET, repo, &kind.to_string().replace('_', " "), &e);
                let _ = missing.insert(kind);
                None
            }
        }
    }
}

/// Run `fetch_repo` for every repository in order, turning its result into an outcome.
///
/// A panic inside `fetch_repo` becomes a [`FetchOutcome::CriticalFailure`] for that
/// repository and the loop continues with the next one.
async fn fetch_each<F, Fut>(
    repos: &[RepoId],
    repo_delay: Duration,
    progress: &dyn Progress,
    diagnostics: &Diagnostics,
    fetch_repo: F,
) -> FetchReport
where
    F: Fn(RepoId) -> Fut,
    Fut: Future<Output = Result<(RepoFetch, BTreeSet<ResourceKind>), FetchError>>,
{
    let mut report = FetchReport::default();
    let total = repos.len() as u64;

    progress.set_phase("Fetching");

    for (index, repo) in repos.iter().enumerate() {
        progress.set_position(index as u64 + 1, total, &repo.to_string());
        log::info!(target: LOG_TARGET, "Fetching repository {}/{total}: {repo}", index + 1);

        let attempt = AssertUnwindSafe(async { fetch_repo(repo.clone()).await });
        let outcome = match attempt.catch_unwind().await {
            Ok(Ok((fetch, missing))) => {
                report.repos.push(fetch);
                FetchOutcome::from_missing(missing)
            }
            Ok(Err(e)) => {
                diagnostics.fetch_failed(LOG_TARGET, repo, "basic info", &e);
                FetchOutcome::CriticalFailure { reason: e.to_string() }
            }
            Err(panic) => {
                let reason = format!("unexpected failure: {}", panic_message(panic.as_ref()));
                diagnostics.error(LOG_TARGET, repo, &reason);
                FetchOutcome::CriticalFailure { reason }
            }
        };

        let _ = report.outcomes.insert(repo.clone(), outcome);

        if index + 1 < repos.len() {
            tokio::time::sleep(repo_delay).await;
        }
    }

    report
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::fetch_for;
    use crate::diagnostics::Severity;
    use crate::facts::{FetchErrorKind, NoProgress};

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "panic");
    }

    #[tokio::test]
    async fn test_panicking_repository_does_not_stop_the_run() {
        let repos = [RepoId::parse("octo/boom").unwrap(), RepoId::parse("octo/fine").unwrap()];
        let diagnostics = Diagnostics::new();

        let report = fetch_each(&repos, Duration::ZERO, &NoProgress, &diagnostics, |repo| async move {
            if repo.name() == "boom" {
                panic!("exploded while fetching");
            }
            Ok((fetch_for(&repo.to_string()), BTreeSet::new()))
        })
        .await;

        assert_eq!(
            report.outcomes[&repos[0]],
            FetchOutcome::CriticalFailure {
                reason: "unexpected failure: exploded while fetching".into()
            }
        );
        assert_eq!(report.outcomes[&repos[1]], FetchOutcome::Success);
        assert_eq!(report.repos.len(), 1);
        assert_eq!(report.repos[0].repo_id(), &repos[1]);

        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Error);
        assert_eq!(entries[0].scope, "octo/boom");
    }

    #[tokio::test]
    async fn test_basic_info_failure_is_critical() {
        let repos = [RepoId::parse("octo/gone").unwrap()];
        let diagnostics = Diagnostics::new();

        let report = fetch_each(&repos, Duration::ZERO, &NoProgress, &diagnostics, |_| async {
            Err(FetchError::new(FetchErrorKind::NotFound, "GET /repos/octo/gone returned 404 Not Found"))
        })
        .await;

        assert!(report.outcomes[&repos[0]].is_critical());
        assert!(report.repos.is_empty());
        assert_eq!(diagnostics.count_at_least(Severity::Warn), 1);
    }
}
