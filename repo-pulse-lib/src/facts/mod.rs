//! Data acquisition from the repository hosting API
//!
//! This module turns a list of targets into raw per-repository records.
//!
//! # Implementation Model
//!
//! - [`Client`] performs single HTTP reads and classifies failures into [`FetchErrorKind`].
//! - [`Paginator`] follows `Link: rel="next"` headers over list endpoints, bounded to
//!   [`MAX_PAGES`] requests.
//! - [`RepoApi`] wraps both for the five repository resources and the organization listing,
//!   mapping raw upstream shapes into record types.
//! - [`resolve_targets`] expands organizations and `owner/name` strings into [`RepoId`]s.
//! - [`Orchestrator`] walks the resolved repositories one at a time and produces a
//!   [`FetchReport`] with one [`FetchOutcome`] per repository.
//!
//! Failures are never collapsed into empty lists: a resource that could not be fetched is
//! `None` in [`RepoFetch`], and its kind is listed in the repository's outcome.

mod client;
mod fetch_error;
mod fetch_outcome;
mod orchestrator;
mod paginator;
mod progress;
mod records;
mod repo_id;
mod resolver;
mod resources;

pub use client::{Client, Page};
pub use fetch_error::{FetchError, FetchErrorKind, RateLimitInfo};
pub use fetch_outcome::{FetchOutcome, ResourceKind};
pub use orchestrator::{FetchOptions, FetchReport, Orchestrator, RepoFetch};
pub use paginator::{MAX_PAGES, PAGE_SIZE, Paginator, RateLimitRetry};
pub use progress::{NoProgress, Progress};
pub use records::{BasicInfo, CommitRecord, ContributorRecord, IssueRecord, ItemState, MissingField, PullRequestRecord};
pub use repo_id::RepoId;
pub use resolver::{Resolution, resolve_targets};
pub use resources::RepoApi;
