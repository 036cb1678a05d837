use crate::Result;
use crate::facts::{FetchOptions, RateLimitRetry};
use camino::Utf8Path;
use chrono::{DateTime, Months, Utc};
use core::fmt::{Debug, Formatter};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

const MAX_COMMIT_HISTORY_MONTHS: u32 = 120;

/// Settings of one collection run.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Organization names and/or `owner/name` repository identifiers
    #[serde(default)]
    pub targets: Vec<String>,

    /// API token attached to every request
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Pause after every API call, in milliseconds
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,

    /// Pause after every repository, in milliseconds
    #[serde(default = "default_repo_delay_ms")]
    pub repo_delay_ms: u64,

    /// Length of the commit history window, in months
    #[serde(default = "default_commit_history_months")]
    pub commit_history_months: u32,

    #[serde(default = "default_true")]
    pub fetch_contributors: bool,

    #[serde(default = "default_true")]
    pub fetch_commits: bool,

    #[serde(default = "default_true")]
    pub fetch_pull_requests: bool,

    /// Retries of a rate-limited page; 0 disables retrying
    #[serde(default)]
    pub rate_limit_retries: u32,

    /// Initial backoff between rate-limit retries, in milliseconds
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_call_delay_ms() -> u64 {
    500
}

const fn default_repo_delay_ms() -> u64 {
    2000
}

const fn default_commit_history_months() -> u32 {
    12
}

const fn default_true() -> bool {
    true
}

const fn default_rate_limit_backoff_ms() -> u64 {
    60_000
}

impl RunConfig {
    /// Load configuration from a file or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds invalid values
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range or unparsable
    pub fn validate(&self) -> Result<()> {
        let _ = url::Url::parse(&self.api_url).into_app_err_with(|| format!("invalid api_url '{}'", self.api_url))?;

        if !(1..=MAX_COMMIT_HISTORY_MONTHS).contains(&self.commit_history_months) {
            return Err(app_err!(
                "commit_history_months must be between 1 and {MAX_COMMIT_HISTORY_MONTHS}, got {}",
                self.commit_history_months
            ));
        }

        if self.rate_limit_retries > 0 && self.rate_limit_backoff_ms == 0 {
            return Err(app_err!("rate_limit_backoff_ms must be positive when rate_limit_retries is set"));
        }

        Ok(())
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RateLimitRetry {
        RateLimitRetry {
            max_retries: self.rate_limit_retries,
            base_delay: Duration::from_millis(self.rate_limit_backoff_ms),
        }
    }

    /// Start of the commit history window ending at `now`.
    #[must_use]
    pub fn commits_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.commit_history_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    #[must_use]
    pub fn fetch_options(&self, now: DateTime<Utc>) -> FetchOptions {
        FetchOptions {
            call_delay: Duration::from_millis(self.call_delay_ms),
            repo_delay: Duration::from_millis(self.repo_delay_ms),
            fetch_contributors: self.fetch_contributors,
            commits_since: self.fetch_commits.then(|| self.commits_since(now)),
            fetch_pull_requests: self.fetch_pull_requests,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to RunConfig")
    }
}

impl Debug for RunConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunConfig")
            .field("targets", &self.targets)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("call_delay_ms", &self.call_delay_ms)
            .field("repo_delay_ms", &self.repo_delay_ms)
            .field("commit_history_months", &self.commit_history_months)
            .field("fetch_contributors", &self.fetch_contributors)
            .field("fetch_commits", &self.fetch_commits)
            .field("fetch_pull_requests", &self.fetch_pull_requests)
            .field("rate_limit_retries", &self.rate_limit_retries)
            .field("rate_limit_backoff_ms", &self.rate_limit_backoff_ms)
            .finish()
    }
}
