//! End-to-end collection run
//!
//! `targets → resolve → fetch → process → aggregate → ResultBundle`, strictly in sequence.
//! Per-repository and per-resource failures are recorded and skipped; only the conditions
//! that leave nothing to report abort the run.

use crate::Result;
use crate::aggregate::aggregate;
use crate::bundle::ResultBundle;
use crate::config::RunConfig;
use crate::diagnostics::Diagnostics;
use crate::facts::{Client, FetchErrorKind, Orchestrator, Progress, RepoApi, resolve_targets};
use crate::metrics::{ProcessedRepo, process_repo};
use chrono::{DateTime, Utc};
use ohno::{EnrichableExt, bail};

const LOG_TARGET: &str = "  pipeline";

/// Run a full collection for `config`.
///
/// # Errors
///
/// Fails when no target is configured, when the API rejects the token, when no
/// repository could be resolved, or when basic info could not be fetched for any
/// repository.
pub async fn run_pipeline(config: &RunConfig, now: DateTime<Utc>, progress: &dyn Progress) -> Result<ResultBundle> {
    if config.targets.iter().all(|t| t.trim().is_empty()) {
        bail!("no targets configured: pass organization names or 'owner/name' repositories");
    }

    config.validate()?;

    let diagnostics = Diagnostics::new();
    let client = Client::new(config.token.as_deref(), config.api_url.as_str()).map_err(|e| e.enrich("creating API client"))?;
    let api = RepoApi::new(client, config.retry_policy());

    if config.token.is_some() {
        progress.set_phase("Authenticating");
        match api.verify_authentication().await {
            Ok(login) => log::info!(target: LOG_TARGET, "Authenticated as '{login}'"),
            Err(e) if e.kind() == FetchErrorKind::Unauthorized => {
                progress.done();
                bail!("authentication failed, check the API token: {e}");
            }
            Err(e) => diagnostics.warn(LOG_TARGET, "authentication", format_args!("could not verify the API token: {e}")),
        }
    } else {
        diagnostics.warn(
            LOG_TARGET,
            "authentication",
            "no API token configured, requests are subject to the unauthenticated rate limit",
        );
    }

    progress.set_phase("Resolving");
    let resolution = resolve_targets(&api, &config.targets, &diagnostics).await;
    if resolution.repos.is_empty() {
        progress.done();
        bail!("no repositories resolved from {} target(s)", config.targets.len());
    }
    log::info!(target: LOG_TARGET, "Resolved {} repositories", resolution.repos.len());

    let report = Orchestrator::new(&api, config.fetch_options(now))
        .fetch_all(&resolution.repos, progress, &diagnostics)
        .await;

    if report.repos.is_empty() {
        progress.done();
        bail!("could not fetch basic info for any of the {} resolved repositories", resolution.repos.len());
    }

    progress.set_phase("Processing");
    let processed: Vec<ProcessedRepo> = report.repos.iter().map(|fetch| process_repo(fetch, now, &diagnostics)).collect();
    let aggregates = aggregate(&report.repos, &processed);

    progress.done();
    log::info!(
        target: LOG_TARGET,
        "Collected {} of {} repositories",
        processed.len(),
        resolution.repos.len()
    );

    let mut repo_metrics = Vec::with_capacity(processed.len());
    let mut pull_request_metrics = Vec::new();
    let mut issue_close_times = Vec::new();
    for repo in processed {
        repo_metrics.push(repo.metrics);
        pull_request_metrics.extend(repo.pull_requests);
        issue_close_times.extend(repo.close_times);
    }

    Ok(ResultBundle {
        generated_at: now,
        config: RunConfig {
            token: None,
            ..config.clone()
        },
        outcomes: report.outcomes,
        resolution_errors: resolution.errors,
        repo_metrics,
        pull_request_metrics,
        issue_close_times,
        close_time_stats: aggregates.close_time_stats,
        close_time_trend: aggregates.close_time_trend,
        contributors: aggregates.contributors,
        commit_activity: aggregates.commit_activity,
        languages: aggregates.languages,
        overall: aggregates.overall,
        diagnostics: diagnostics.into_entries(),
    })
}
