//! GitHub API client
//!
//! Thin wrapper over `reqwest` that attaches the token to every request, classifies
//! failures into [`FetchErrorKind`], and exposes single-item and single-page reads.

use super::fetch_error::{FetchError, FetchErrorKind, RateLimitInfo};
use chrono::DateTime;
use core::time::Duration;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "    client";

/// Timeout applied to every API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Remaining-request budget below which the rate limit is reported.
const LOW_RATE_LIMIT_THRESHOLD: usize = 100;

/// One page of a list endpoint.
#[derive(Debug)]
pub struct Page<T> {
    /// `None` when the upstream answered with a literal `null` body.
    pub items: Option<Vec<T>>,
    pub has_next: bool,
    pub rate_limit: Option<RateLimitInfo>,
}

/// Hosting API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new API client with optional authentication token and base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("repo-pulse/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single JSON object.
    pub async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let (resp, rate_limit) = self.send(path, &[]).await?;
        resp.json().await.map_err(|e| {
            FetchError::new(FetchErrorKind::Unclassified, format!("decoding response of GET {path}: {e}")).with_rate_limit(rate_limit)
        })
    }

    /// Fetch one page of a list endpoint.
    pub async fn get_page<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Page<T>, FetchError> {
        let (resp, rate_limit) = self.send(path, query).await?;
        let has_next = has_next_page(resp.headers());

        let items: Option<Vec<T>> = resp.json().await.map_err(|e| {
            FetchError::new(FetchErrorKind::Unclassified, format!("decoding response of GET {path}: {e}")).with_rate_limit(rate_limit)
        })?;

        Ok(Page { items, has_next, rate_limit })
    }

    /// Make an API call and classify the result
    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<(reqwest::Response, Option<RateLimitInfo>), FetchError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!(target: LOG_TARGET, "GET {url} {query:?}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Unclassified, format!("GET {path} failed: {e}")))?;

        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        if let Some(rl) = rate_limit
            && rl.remaining < LOW_RATE_LIMIT_THRESHOLD
        {
            log::info!(target: LOG_TARGET, "API rate limit low: {} request(s) remaining until {}", rl.remaining, rl.reset_at);
        }

        let status = resp.status();
        if let Some(kind) = FetchErrorKind::from_status(status) {
            return Err(FetchError::new(kind, format!("GET {path} returned {status}")).with_rate_limit(rate_limit));
        }

        Ok((resp, rate_limit))
    }
}

/// Whether the `Link` header advertises a further page
fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|link_str| link_str.contains(r#"rel="next""#))
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
