use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Classification of a failed upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FetchErrorKind {
    /// 404: the repository, organization or resource does not exist.
    NotFound,

    /// 401: the token was rejected.
    Unauthorized,

    /// 403 or 429: rate limited, or the token lacks access.
    RateLimitedOrForbidden,

    /// 409: typically an empty repository (no commits yet).
    Conflict,

    /// 204: the upstream answered without a body.
    NoContent,

    /// Transport failures, timeouts, undecodable bodies and any other status.
    Unclassified,
}

impl FetchErrorKind {
    /// Map a non-success HTTP status to its failure class.
    ///
    /// Returns `None` for statuses that are not failures.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status.as_u16() {
            204 => Some(Self::NoContent),
            401 => Some(Self::Unauthorized),
            403 | 429 => Some(Self::RateLimitedOrForbidden),
            404 => Some(Self::NotFound),
            409 => Some(Self::Conflict),
            _ if status.is_success() => None,
            _ => Some(Self::Unclassified),
        }
    }

    /// Severity at which failures of this class are reported.
    #[must_use]
    pub const fn log_level(self) -> log::Level {
        match self {
            Self::NotFound => log::Level::Warn,
            Self::Conflict | Self::NoContent => log::Level::Info,
            Self::Unauthorized | Self::RateLimitedOrForbidden | Self::Unclassified => log::Level::Error,
        }
    }
}

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// A classified failure of one upstream call.
///
/// Returned instead of a partial result so that callers can never mistake a
/// failed listing for an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    rate_limit: Option<RateLimitInfo>,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            rate_limit: None,
        }
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitInfo>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn rate_limit(&self) -> Option<RateLimitInfo> {
        self.rate_limit
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl core::error::Error for FetchError {}
