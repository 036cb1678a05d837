//! Per-resource fetchers.
//!
//! Each method reads one kind of upstream resource and maps it to the crate's record
//! types. Failures are returned as [`FetchError`] and never collapsed into an empty
//! list; entries missing structurally required fields are dropped with a warning.

use super::client::Client;
use super::fetch_error::FetchError;
use super::paginator::{Paginator, RateLimitRetry};
use super::records::{
    BasicInfo, CommitRecord, ContributorRecord, IssueRecord, MissingField, PullRequestRecord, RawCommit, RawContributor, RawIssue,
    RawPullRequest, RawRepo, RawUser,
};
use super::{FetchErrorKind, RepoId};
use crate::diagnostics::Diagnostics;
use chrono::{DateTime, SecondsFormat, Utc};

const LOG_TARGET: &str = " resources";

/// Typed access to the repository endpoints of the upstream API.
#[derive(Debug, Clone)]
pub struct RepoApi {
    client: Client,
    retry: RateLimitRetry,
}

impl RepoApi {
    #[must_use]
    pub const fn new(client: Client, retry: RateLimitRetry) -> Self {
        Self { client, retry }
    }

    fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.client, self.retry)
    }

    /// Probe the authenticated-user endpoint and return the login the token belongs to.
    pub async fn verify_authentication(&self) -> Result<String, FetchError> {
        let user: RawUser = self.client.get_one("/user").await?;
        user.login
            .ok_or_else(|| FetchError::new(FetchErrorKind::Unclassified, "authenticated user has no login"))
    }

    pub async fn basic_info(&self, repo: &RepoId) -> Result<BasicInfo, FetchError> {
        let raw: RawRepo = self.client.get_one(&repo.api_path("")).await?;
        BasicInfo::from_raw(repo, raw).map_err(|MissingField(field)| {
            FetchError::new(FetchErrorKind::Unclassified, format!("repository metadata for '{repo}' has no {field}"))
        })
    }

    /// All issues, open and closed. Pull requests listed by the issues endpoint are excluded.
    pub async fn issues(&self, repo: &RepoId, diagnostics: &Diagnostics) -> Result<Vec<IssueRecord>, FetchError> {
        let scope = repo.to_string();
        let raw: Vec<RawIssue> = self
            .paginator()
            .fetch_all(&repo.api_path("/issues"), &[("state", "all".to_string())], &scope, diagnostics)
            .await?;

        let total = raw.len();
        let issues: Vec<RawIssue> = raw.into_iter().filter(|issue| !issue.is_pull_request()).collect();
        log::debug!(target: LOG_TARGET, "{scope}: {} of {total} issue entries are pull requests", total - issues.len());

        Ok(map_entries(issues, &scope, "issue", diagnostics, IssueRecord::from_raw))
    }

    pub async fn contributors(&self, repo: &RepoId, diagnostics: &Diagnostics) -> Result<Vec<ContributorRecord>, FetchError> {
        let scope = repo.to_string();
        let raw: Vec<RawContributor> = self
            .paginator()
            .fetch_all(&repo.api_path("/contributors"), &[], &scope, diagnostics)
            .await?;

        Ok(map_entries(raw, &scope, "contributor", diagnostics, ContributorRecord::from_raw))
    }

    /// Commits whose primary date is on or after `since`.
    pub async fn commits(&self, repo: &RepoId, since: DateTime<Utc>, diagnostics: &Diagnostics) -> Result<Vec<CommitRecord>, FetchError> {
        let scope = repo.to_string();
        let params = [("since", since.to_rfc3339_opts(SecondsFormat::Secs, true))];
        let raw: Vec<RawCommit> = self
            .paginator()
            .fetch_all(&repo.api_path("/commits"), &params, &scope, diagnostics)
            .await?;

        let mut commits = map_entries(raw, &scope, "commit", diagnostics, CommitRecord::from_raw);

        let before = commits.len();
        commits.retain(|c| c.primary_date >= since);
        let stale = before - commits.len();
        if stale > 0 {
            diagnostics.warn(
                LOG_TARGET,
                &scope,
                format_args!("dropped {stale} commit(s) dated before {since} despite the since filter"),
            );
        }

        Ok(commits)
    }

    /// Open and closed (including merged) pull requests.
    ///
    /// The two states are listed separately. When one listing fails but the other
    /// returned data, that data is returned on its own; when the surviving listing is
    /// empty the failure is returned.
    pub async fn pull_requests(&self, repo: &RepoId, diagnostics: &Diagnostics) -> Result<Vec<PullRequestRecord>, FetchError> {
        let scope = repo.to_string();
        let path = repo.api_path("/pulls");
        let paginator = self.paginator();

        let open: Result<Vec<RawPullRequest>, FetchError> = paginator
            .fetch_all(&path, &[("state", "open".to_string())], &scope, diagnostics)
            .await;
        let closed: Result<Vec<RawPullRequest>, FetchError> = paginator
            .fetch_all(&path, &[("state", "closed".to_string())], &scope, diagnostics)
            .await;

        let raw = match (open, closed) {
            (Ok(mut open), Ok(closed)) => {
                open.extend(closed);
                open
            }
            (Err(e), Ok(available)) | (Ok(available), Err(e)) => {
                if available.is_empty() {
                    return Err(e);
                }
                diagnostics.warn(
                    LOG_TARGET,
                    &scope,
                    format_args!("pull request listing is incomplete, keeping {} entries: {e}", available.len()),
                );
                available
            }
            (Err(e), Err(_)) => return Err(e),
        };

        Ok(map_entries(raw, &scope, "pull request", diagnostics, PullRequestRecord::from_raw))
    }

    /// Public repositories of an organization.
    pub async fn org_repositories(&self, org: &str, diagnostics: &Diagnostics) -> Result<Vec<RepoId>, FetchError> {
        let raw: Vec<RawRepo> = self
            .paginator()
            .fetch_all(&format!("/orgs/{org}/repos"), &[("type", "public".to_string())], org, diagnostics)
            .await?;

        Ok(map_entries(raw, org, "repository", diagnostics, |repo| {
            repo.full_name
                .as_deref()
                .and_then(|name| RepoId::parse(name).ok())
                .ok_or(MissingField("full_name"))
        }))
    }
}

fn map_entries<R, T>(
    raw: Vec<R>,
    scope: &str,
    what: &str,
    diagnostics: &Diagnostics,
    map: impl Fn(R) -> Result<T, MissingField>,
) -> Vec<T> {
    raw.into_iter()
        .filter_map(|entry| match map(entry) {
            Ok(record) => Some(record),
            Err(MissingField(field)) => {
                diagnostics.warn(LOG_TARGET, scope, format_args!("skipping {what} entry without {field}"));
                None
            }
        })
        .collect()
}
