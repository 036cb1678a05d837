use super::common::{ColorMode, LogLevel, init_logging};
use super::{Host, ProgressReporter};
use crate::Result;
use crate::bundle::ResultBundle;
use crate::config::RunConfig;
use crate::diagnostics::Severity;
use crate::pipeline::run_pipeline;
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Args;
use core::time::Duration;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

/// Progress stays hidden for runs shorter than this.
const PROGRESS_DELAY: Duration = Duration::from_millis(300);

/// Effectively never; used when log output would interleave with the bar.
const PROGRESS_NEVER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Organization names or `owner/name` repositories, replacing the configured targets
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Path to configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Write the results to a JSON file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Never show the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl CollectArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply_to(&self, config: &mut RunConfig) {
        if !self.targets.is_empty() {
            config.targets.clone_from(&self.targets);
        }

        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }

        if let Some(api_url) = &self.api_url {
            config.api_url.clone_from(api_url);
        }
    }
}

pub async fn collect<H: Host>(host: &mut H, args: &CollectArgs) -> Result<()> {
    init_logging(args.log_level);

    let mut config = RunConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let delay = if args.no_progress || args.log_level != LogLevel::None {
        PROGRESS_NEVER
    } else {
        PROGRESS_DELAY
    };
    let progress = ProgressReporter::new(delay, args.color.use_colors_on_stderr());

    let bundle = run_pipeline(&config, Utc::now(), &progress).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&bundle)
    } else {
        serde_json::to_string(&bundle)
    }
    .into_app_err("serializing collection results")?;

    if let Some(path) = &args.output {
        fs::write(path, json).into_app_err_with(|| format!("writing results to '{path}'"))?;
    } else {
        let _ = writeln!(host.output(), "{json}");
    }

    let _ = writeln!(host.error(), "{}", summary(&bundle));
    Ok(())
}

fn summary(bundle: &ResultBundle) -> String {
    let count = |severity: Severity| bundle.diagnostics.iter().filter(|d| d.severity == severity).count();

    format!(
        "Collected {} of {} repositories ({} warning(s), {} error(s))",
        bundle.repo_metrics.len(),
        bundle.outcomes.len(),
        count(Severity::Warn),
        count(Severity::Error),
    )
}
