//! Command-line interface for repo-pulse
//!
//! # Implementation Model
//!
//! The `run` function parses command-line arguments using clap and routes to one of
//! two commands:
//!
//! - **collect**: Load the configuration, apply command-line overrides, run the
//!   collection pipeline, and write the resulting bundle as JSON to a file or stdout.
//! - **init**: Generate a default configuration file.
//!
//! All terminal output goes through the [`Host`] trait so commands can be exercised
//! in tests with captured buffers.

mod collect;
mod common;
mod host;
mod init;
mod progress_reporter;
mod run;

pub use collect::{CollectArgs, collect};
pub use common::{ColorMode, LogLevel};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
