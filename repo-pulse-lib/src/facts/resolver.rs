use super::RepoId;
use super::resources::RepoApi;
use crate::diagnostics::Diagnostics;
use std::collections::{BTreeMap, HashSet};

const LOG_TARGET: &str = "  resolver";

/// Outcome of expanding the configured targets into repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Deduplicated repositories, in the order they were first seen.
    pub repos: Vec<RepoId>,

    /// Targets that could not be expanded, with the reason.
    pub errors: BTreeMap<String, String>,
}

/// Expand organization names and `owner/name` strings into a list of repositories.
///
/// A failure on one target is recorded in [`Resolution::errors`] and resolution
/// continues with the remaining targets.
pub async fn resolve_targets(api: &RepoApi, targets: &[String], diagnostics: &Diagnostics) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen = HashSet::new();

    for target in targets {
        let target = target.trim();
        if target.is_empty() {
            diagnostics.warn(LOG_TARGET, "targets", "ignoring empty target");
            continue;
        }

        let found = if target.contains('/') {
            match RepoId::parse(target) {
                Ok(id) => vec![id],
                Err(e) => {
                    diagnostics.error(LOG_TARGET, target, &e);
                    let _ = resolution.errors.insert(target.to_string(), e.to_string());
                    continue;
                }
            }
        } else {
            match api.org_repositories(target, diagnostics).await {
                Ok(repos) => {
                    if repos.is_empty() {
                        diagnostics.warn(LOG_TARGET, target, "organization has no public repositories");
                    } else {
                        log::info!(target: LOG_TARGET, "Organization '{target}' has {} public repositories", repos.len());
                    }
                    repos
                }
                Err(e) => {
                    diagnostics.fetch_failed(LOG_TARGET, target, "organization repositories", &e);
                    let _ = resolution.errors.insert(target.to_string(), e.to_string());
                    continue;
                }
            }
        };

        for id in found {
            if seen.insert(id.clone()) {
                resolution.repos.push(id);
            } else {
                log::debug!(target: LOG_TARGET, "Skipping duplicate repository '{id}'");
            }
        }
    }

    resolution
}
