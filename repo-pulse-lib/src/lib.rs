#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for repo-pulse
//!
//! This library consolidates all functionality for the repo-pulse tool, which collects
//! activity data for GitHub repositories and organizations and condenses it into
//! per-repository metrics and cross-repository rollups.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface
//! - [`facts`]: Target resolution and data acquisition from the hosting API
//! - [`metrics`]: Per-repository metrics derived from fetched records
//! - [`aggregate`]: Cross-repository rollups and statistics
//! - [`pipeline`]: The end-to-end collection run producing a [`ResultBundle`]

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod aggregate;
#[cfg(not(any(debug_assertions, test)))]
mod aggregate;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod facts;
#[cfg(not(any(debug_assertions, test)))]
mod facts;

#[cfg(any(debug_assertions, test))]
pub mod metrics;
#[cfg(not(any(debug_assertions, test)))]
mod metrics;

mod bundle;
mod config;
mod diagnostics;
mod pipeline;

pub use crate::bundle::ResultBundle;
pub use crate::commands::{Host, run};
pub use crate::config::{DEFAULT_CONFIG_TOML, RunConfig};
pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
pub use crate::pipeline::run_pipeline;
