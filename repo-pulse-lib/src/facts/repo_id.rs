use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifies a repository as `owner/name`.
///
/// Created by the target resolver and used as the key for every per-repository
/// collection in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    owner: Arc<str>,
    name: Arc<str>,
}

impl RepoId {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let Some((owner, name)) = text.split_once('/') else {
            bail!("invalid repository identifier '{text}': expected 'owner/name'");
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() {
            bail!("invalid repository identifier '{text}': empty owner or repository name");
        }

        if name.contains('/') {
            bail!("invalid repository identifier '{text}': too many path segments");
        }

        Ok(Self {
            owner: Arc::from(owner),
            name: Arc::from(name),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API path for this repository, optionally followed by a resource suffix.
    #[must_use]
    pub fn api_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.owner, self.name)
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<String> for RepoId {
    type Error = ohno::AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}
