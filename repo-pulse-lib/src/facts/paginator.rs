//! Cursor-following reads over list endpoints.

use super::client::{Client, Page};
use super::fetch_error::{FetchError, FetchErrorKind, RateLimitInfo};
use crate::diagnostics::Diagnostics;
use chrono::{DateTime, Utc};
use core::time::Duration;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = " paginator";

/// Hard ceiling on page requests for a single listing.
pub const MAX_PAGES: u32 = 50;

/// Items requested per page.
pub const PAGE_SIZE: u8 = 100;

/// Longest a rate-limited request will wait before being retried.
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(3600);

/// Opt-in retry policy for rate-limited pages.
///
/// With `max_retries == 0` a rate-limited page fails the listing immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitRetry {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RateLimitRetry {
    /// How long to wait before retry number `attempt` (zero-based).
    ///
    /// Waits for the advertised reset when the upstream provided one, otherwise
    /// backs off exponentially from `base_delay`. Never exceeds one hour.
    #[must_use]
    pub fn wait_for(&self, attempt: u32, rate_limit: Option<RateLimitInfo>, now: DateTime<Utc>) -> Duration {
        let advertised = rate_limit
            .filter(|rl| rl.reset_at > now)
            .and_then(|rl| (rl.reset_at - now).to_std().ok());

        let wait = advertised.unwrap_or_else(|| self.base_delay.saturating_mul(1u32 << attempt.min(16)));
        wait.min(MAX_RATE_LIMIT_WAIT)
    }
}

/// Reads every page of a list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a> {
    client: &'a Client,
    retry: RateLimitRetry,
}

impl<'a> Paginator<'a> {
    #[must_use]
    pub const fn new(client: &'a Client, retry: RateLimitRetry) -> Self {
        Self { client, retry }
    }

    /// Fetch and concatenate every page of `path`.
    ///
    /// Pagination stops when no further page is announced, when a page comes back
    /// empty or `null`, or after [`MAX_PAGES`] requests. Any failed request fails the
    /// whole listing; items gathered before the failure are discarded.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        scope: &str,
        diagnostics: &Diagnostics,
    ) -> Result<Vec<T>, FetchError> {
        let mut items = Vec::new();
        let mut page_num = 1u32;

        loop {
            let mut query = params.to_vec();
            query.push(("per_page", PAGE_SIZE.to_string()));
            query.push(("page", page_num.to_string()));

            let page = self.fetch_page(path, &query, scope, diagnostics).await?;

            match page.items {
                None => {
                    diagnostics.warn(LOG_TARGET, scope, format_args!("page {page_num} of {path} was null, stopping pagination"));
                    break;
                }
                Some(batch) if batch.is_empty() => {
                    if page_num == 1 {
                        log::debug!(target: LOG_TARGET, "{scope}: {path} has no items");
                    } else {
                        diagnostics.warn(
                            LOG_TARGET,
                            scope,
                            format_args!("page {page_num} of {path} was empty, stopping pagination with {} item(s)", items.len()),
                        );
                    }
                    break;
                }
                Some(batch) => items.extend(batch),
            }

            if !page.has_next {
                break;
            }

            if page_num >= MAX_PAGES {
                diagnostics.warn(
                    LOG_TARGET,
                    scope,
                    format_args!("reached the {MAX_PAGES}-page limit for {path}, stopping pagination with {} item(s)", items.len()),
                );
                break;
            }

            page_num += 1;
        }

        log::debug!(target: LOG_TARGET, "{scope}: fetched {} item(s) from {path} in {page_num} page(s)", items.len());
        Ok(items)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        scope: &str,
        diagnostics: &Diagnostics,
    ) -> Result<Page<T>, FetchError> {
        let mut attempt = 0u32;

        loop {
            match self.client.get_page(path, query).await {
                Err(e) if e.kind() == FetchErrorKind::RateLimitedOrForbidden && attempt < self.retry.max_retries => {
                    let wait = self.retry.wait_for(attempt, e.rate_limit(), Utc::now());
                    diagnostics.warn(
                        LOG_TARGET,
                        scope,
                        format_args!(
                            "rate limited on {path}, retrying in {}s (attempt {}/{})",
                            wait.as_secs(),
                            attempt + 1,
                            self.retry.max_retries
                        ),
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
