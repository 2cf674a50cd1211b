//! Repository acquisition.
//!
//! [`GitDownloader`] clones each configured git source into
//! `sources_dir/<name>` and reports local sources in place. Clones run
//! concurrently; the manifest keeps configuration order. A source that cannot
//! be fetched is logged and left out of the manifest.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::contract::{DownloadError, DownloadedManifest, DownloadedSource, Downloader};

pub const GITHUB_ORG: &str = "solidjs";

/// Ecosystem repositories fetched when no sources are configured.
pub const PRIORITY_REPOS: [&str; 8] = [
    "solid",
    "solid-docs",
    "solid-start",
    "solid-router",
    "signals",
    "solid-site",
    "templates",
    "vite-plugin-solid",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceAction>,
    /// Never clone; only report what is already on disk.
    #[serde(default)]
    pub offline: bool,
}

fn default_sources_dir() -> PathBuf {
    PathBuf::from("raw_sources")
}

fn default_sources() -> Vec<SourceAction> {
    PRIORITY_REPOS
        .iter()
        .map(|repo| {
            SourceAction::Git(GitSource {
                name: repo.to_string(),
                repo_url: format!("https://github.com/{GITHUB_ORG}/{repo}.git"),
                reference: None,
            })
        })
        .collect()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            sources_dir: default_sources_dir(),
            sources: default_sources(),
            offline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceAction {
    Git(GitSource),
    Local(LocalSource),
}

impl SourceAction {
    /// Repository name; first segment of every relative path from this source.
    pub fn name(&self) -> &str {
        match self {
            SourceAction::Git(git) => &git.name,
            SourceAction::Local(local) => &local.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    pub name: String,
    pub repo_url: String,
    /// Branch or tag passed to `git clone --branch`.
    #[serde(default)]
    pub reference: Option<String>,
}

/// An already checked-out directory, used as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSource {
    pub name: String,
    pub path: PathBuf,
}

pub struct GitDownloader {
    config: DownloadConfig,
}

impl GitDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    async fn fetch(&self, source: &SourceAction) -> Option<DownloadedSource> {
        match source {
            SourceAction::Local(local) => {
                if local.path.is_dir() {
                    debug!(repo = %local.name, path = %local.path.display(), "Using local source");
                    Some(DownloadedSource {
                        name: local.name.clone(),
                        local_path: local.path.clone(),
                    })
                } else {
                    warn!(repo = %local.name, path = %local.path.display(), "Local source does not exist, skipping");
                    None
                }
            }
            SourceAction::Git(git) => {
                let dest = self.config.sources_dir.join(&git.name);
                if dest.exists() {
                    warn!(repo = %git.name, path = %dest.display(), "Repository already exists, skipping clone");
                } else if self.config.offline {
                    warn!(repo = %git.name, "Offline and repository not present, skipping");
                    return None;
                } else if !clone(git, &dest).await {
                    return None;
                }
                Some(DownloadedSource {
                    name: git.name.clone(),
                    local_path: dest,
                })
            }
        }
    }
}

/// `true` when the clone succeeded.
async fn clone(git: &GitSource, dest: &Path) -> bool {
    info!(repo = %git.name, repo_url = %git.repo_url, path = %dest.display(), "Cloning repository");
    let mut cmd = Command::new("git");
    cmd.arg("clone");
    if let Some(reference) = &git.reference {
        cmd.arg("--branch").arg(reference);
    }
    cmd.arg(&git.repo_url).arg(dest);

    match cmd.output().await {
        Ok(out) if out.status.success() => {
            info!(repo = %git.name, path = %dest.display(), "Successfully cloned repository");
            true
        }
        Ok(out) => {
            error!(
                repo = %git.name,
                repo_url = %git.repo_url,
                status = ?out.status,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "Failed to clone repository"
            );
            false
        }
        Err(e) => {
            error!(repo = %git.name, error = ?e, "Failed to launch git process");
            false
        }
    }
}

#[async_trait::async_trait]
impl Downloader for GitDownloader {
    async fn download_all(&self) -> Result<DownloadedManifest, DownloadError> {
        let dir = &self.config.sources_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DownloadError::SourcesDir {
                path: dir.clone(),
                source,
            })?;
        info!(
            sources = self.config.sources.len(),
            sources_dir = %dir.display(),
            offline = self.config.offline,
            "Starting repository acquisition"
        );

        let fetched = join_all(self.config.sources.iter().map(|s| self.fetch(s))).await;
        let sources: Vec<DownloadedSource> = fetched.into_iter().flatten().collect();

        info!(
            total = self.config.sources.len(),
            successful = sources.len(),
            "Repository acquisition completed"
        );
        Ok(DownloadedManifest { sources })
    }
}
