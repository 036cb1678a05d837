//! Records produced by the resource fetchers, and the raw upstream shapes they are mapped from.
//!
//! Upstream fields are all optional on the wire. Mapping to a record either yields a
//! record whose required fields are present, or names the missing field so the caller
//! can drop the entry with a warning.

use super::RepoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of a structurally required upstream field that was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

/// Open/closed state as reported by the issues and pulls endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ItemState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub repo_id: RepoId,
    pub full_name: String,
    pub owner: String,
    pub short_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub open_issues_count: Option<u64>,
    pub html_url: Option<String>,
    pub is_fork: bool,
    pub is_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub state: ItemState,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub state: ItemState,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,

    /// Account login of the author, when the commit is linked to an account.
    pub author_login: Option<String>,

    /// Name recorded in the commit itself.
    pub author_name: Option<String>,

    pub authored_at: Option<DateTime<Utc>>,
    pub committed_at: Option<DateTime<Utc>>,

    /// Committer date, or author date when the committer date is absent.
    pub primary_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub login: String,
    pub contributions: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawUser {
    pub login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRepo {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub owner: Option<RawUser>,
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub open_issues_count: Option<u64>,
    pub html_url: Option<String>,
    pub fork: Option<bool>,
    pub archived: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawIssue {
    pub number: Option<u64>,
    pub state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub user: Option<RawUser>,

    /// Present when the entry is a pull request listed through the issues endpoint.
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPullRequest {
    pub number: Option<u64>,
    pub state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub user: Option<RawUser>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSignature {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCommitDetail {
    pub author: Option<RawSignature>,
    pub committer: Option<RawSignature>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCommit {
    pub sha: Option<String>,
    pub commit: Option<RawCommitDetail>,
    pub author: Option<RawUser>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawContributor {
    pub login: Option<String>,
    pub contributions: Option<u64>,
}

fn parse_state(state: Option<&str>) -> Result<ItemState, MissingField> {
    state.and_then(|s| s.parse().ok()).ok_or(MissingField("state"))
}

fn login_of(user: Option<RawUser>) -> Option<String> {
    user.and_then(|u| u.login)
}

impl BasicInfo {
    pub(crate) fn from_raw(repo_id: &RepoId, raw: RawRepo) -> Result<Self, MissingField> {
        let created_at = raw.created_at.ok_or(MissingField("created_at"))?;

        Ok(Self {
            full_name: raw.full_name.unwrap_or_else(|| repo_id.to_string()),
            owner: login_of(raw.owner).unwrap_or_else(|| repo_id.owner().to_string()),
            short_name: raw.name.unwrap_or_else(|| repo_id.name().to_string()),
            repo_id: repo_id.clone(),
            description: raw.description,
            stars: raw.stargazers_count.unwrap_or(0),
            forks: raw.forks_count.unwrap_or(0),
            language: raw.language.filter(|l| !l.is_empty()),
            created_at,
            updated_at: raw.updated_at,
            pushed_at: raw.pushed_at,
            open_issues_count: raw.open_issues_count,
            html_url: raw.html_url,
            is_fork: raw.fork.unwrap_or(false),
            is_archived: raw.archived.unwrap_or(false),
        })
    }
}

impl RawIssue {
    pub(crate) const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl IssueRecord {
    pub(crate) fn from_raw(raw: RawIssue) -> Result<Self, MissingField> {
        Ok(Self {
            number: raw.number.ok_or(MissingField("number"))?,
            state: parse_state(raw.state.as_deref())?,
            created_at: raw.created_at,
            closed_at: raw.closed_at,
            author: login_of(raw.user),
        })
    }
}

impl PullRequestRecord {
    pub(crate) fn from_raw(raw: RawPullRequest) -> Result<Self, MissingField> {
        Ok(Self {
            number: raw.number.ok_or(MissingField("number"))?,
            state: parse_state(raw.state.as_deref())?,
            created_at: raw.created_at,
            closed_at: raw.closed_at,
            merged_at: raw.merged_at,
            author: login_of(raw.user),
        })
    }

    #[must_use]
    pub const fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

impl CommitRecord {
    pub(crate) fn from_raw(raw: RawCommit) -> Result<Self, MissingField> {
        let sha = raw.sha.ok_or(MissingField("sha"))?;
        let detail = raw.commit.unwrap_or_default();
        let author_sig = detail.author.unwrap_or_default();
        let committed_at = detail.committer.and_then(|c| c.date);
        let authored_at = author_sig.date;

        Ok(Self {
            sha,
            author_login: login_of(raw.author),
            author_name: author_sig.name,
            authored_at,
            committed_at,
            primary_date: committed_at.or(authored_at).ok_or(MissingField("commit date"))?,
        })
    }
}

impl ContributorRecord {
    pub(crate) fn from_raw(raw: RawContributor) -> Result<Self, MissingField> {
        Ok(Self {
            login: raw.login.filter(|l| !l.is_empty()).ok_or(MissingField("login"))?,
            contributions: raw.contributions.ok_or(MissingField("contributions"))?,
        })
    }
}
