//! Run diagnostics
//!
//! Every pipeline component reports its warnings and errors through a [`Diagnostics`]
//! value handed to it by the caller. Each entry is forwarded to the `log` facade and
//! also kept, so the final result bundle carries the run's diagnostic log.

use crate::facts::FetchError;
use core::fmt::Display;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    const fn log_level(self) -> log::Level {
        match self {
            Self::Info => log::Level::Info,
            Self::Warn => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }

    const fn from_log_level(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Self::Info,
        }
    }
}

/// One recorded diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// What the entry is about: a repository, a target, or a pipeline stage.
    pub scope: String,

    pub message: String,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, target: &str, severity: Severity, scope: impl Display, message: impl Display) {
        let scope = scope.to_string();
        let message = message.to_string();
        log::log!(target: target, severity.log_level(), "{scope}: {message}");

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic { severity, scope, message });
    }

    pub fn info(&self, target: &str, scope: impl Display, message: impl Display) {
        self.record(target, Severity::Info, scope, message);
    }

    pub fn warn(&self, target: &str, scope: impl Display, message: impl Display) {
        self.record(target, Severity::Warn, scope, message);
    }

    pub fn error(&self, target: &str, scope: impl Display, message: impl Display) {
        self.record(target, Severity::Error, scope, message);
    }

    /// Record a failed upstream call at the severity matching its class.
    pub fn fetch_failed(&self, target: &str, scope: impl Display, what: &str, error: &FetchError) {
        let severity = Severity::from_log_level(error.kind().log_level());
        self.record(target, severity, scope, format_args!("could not fetch {what}: {error}"));
    }

    /// Number of entries at `severity` or above.
    #[must_use]
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.severity >= severity)
            .count()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
