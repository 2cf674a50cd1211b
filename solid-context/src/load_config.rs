//! `load_config` module: reads the YAML configuration file and applies
//! environment overrides.
//!
//! # Schema
//! ```yaml
//! download:            # optional, defaults to the solidjs priority repositories
//!   sources_dir: raw_sources
//!   offline: false
//!   sources:
//!     - type: git
//!       name: solid-router
//!       repo_url: https://github.com/solidjs/solid-router.git
//!       reference: main
//!     - type: local
//!       name: my-docs
//!       path: ./docs
//! discover:            # optional
//!   exclude: ["**/CHANGELOG.md"]
//! classify:            # optional
//!   default_domain: primitives
//!   repo_domains: { solid-meta: ssr }
//! validation:          # optional
//!   strict: false
//! output:              # required
//!   dir: ai_docs
//! ```
//!
//! # Environment
//! - `SOLID_CONTEXT_SOURCES_DIR` overrides `download.sources_dir`
//! - `SOLID_CONTEXT_OUTPUT_DIR` overrides `output.dir`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use solid_context_core::config::SynchroniseConfig;
use tracing::{error, info};

pub const SOURCES_DIR_ENV: &str = "SOLID_CONTEXT_SOURCES_DIR";
pub const OUTPUT_DIR_ENV: &str = "SOLID_CONTEXT_OUTPUT_DIR";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub pipeline: SynchroniseConfig,
    pub output: OutputSection,
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    pub dir: PathBuf,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        e
    })
    .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let mut config: CliConfig = serde_yaml::from_str(&config_content)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            e
        })
        .context("Failed to parse config YAML")?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");

    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut CliConfig) {
    if let Some(dir) = non_empty_env(SOURCES_DIR_ENV) {
        info!(sources_dir = %dir, "Overriding sources directory from environment");
        config.pipeline.download.sources_dir = PathBuf::from(dir);
    }
    if let Some(dir) = non_empty_env(OUTPUT_DIR_ENV) {
        info!(output_dir = %dir, "Overriding output directory from environment");
        config.output.dir = PathBuf::from(dir);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
