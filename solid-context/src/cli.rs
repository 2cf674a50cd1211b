//! # solid-context CLI Interface
//!
//! Command parsing and the async [`run`] entrypoint. Pipeline logic lives in
//! `solid-context-core`; this module only wires configuration, the git
//! downloader and the [`DirectoryPublisher`] together.
//!
//! ## Commands
//! - `sync --config <file> [--offline]`: full run into the configured output
//!   directory; prints the run report as JSON.
//! - `inspect <file> [--repo <name>]`: transform and classify a single file
//!   and print the result, without writing anything.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solid_context_core::classify::Classifier;
use solid_context_core::contract::FileDescriptor;
use solid_context_core::download::GitDownloader;
use solid_context_core::synchronise::synchronise;
use solid_context_core::transform::{transform, TransformOutcome};

use crate::load_config::load_config;
use crate::publish::DirectoryPublisher;

/// CLI for solid-context: build a SolidJS knowledge base for AI agents.
#[derive(Parser)]
#[clap(
    name = "solid-context",
    version,
    about = "Aggregate SolidJS ecosystem documentation into a classified, indexed knowledge base"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, process and publish all configured repositories
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Use already downloaded repositories only
        #[clap(long)]
        offline: bool,
    },
    /// Transform and classify one file and print the result
    Inspect {
        file: PathBuf,
        /// Repository name to attribute the file to (defaults to its parent directory)
        #[clap(long)]
        repo: Option<String>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, offline } => {
            let mut config = load_config(config)?;
            if offline {
                config.pipeline.download.offline = true;
            }
            config.pipeline.trace_loaded();
            tracing::info!(command = "sync", output_dir = %config.output.dir.display(), "Starting synchronisation process");

            let downloader = GitDownloader::new(config.pipeline.download.clone());
            let publisher = DirectoryPublisher::new(&config.output.dir);
            match synchronise(&config.pipeline, &downloader, &publisher).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e).context("Synchronisation failed"))
                }
            }
        }
        Commands::Inspect { file, repo } => inspect(&file, repo.as_deref()),
    }
}

fn inspect(file: &Path, repo: Option<&str>) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no file name", file.display()))?;
    let repo = repo
        .map(str::to_string)
        .or_else(|| {
            file.canonicalize()
                .ok()?
                .parent()?
                .file_name()?
                .to_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string());

    let Some(descriptor) = FileDescriptor::new(file, format!("{repo}/{name}")) else {
        bail!("unsupported file type: {} (expected .md, .mdx or .ts)", file.display());
    };
    tracing::info!(command = "inspect", file = %descriptor.relative_path, "Inspecting file");

    match transform(&descriptor) {
        TransformOutcome::Transformed(transformed) => {
            let classified = Classifier::default().classify(transformed);
            println!(
                "{}",
                serde_json::to_string_pretty(&classified.file.classification)?
            );
            println!();
            println!("{}", classified.file.content());
            Ok(())
        }
        TransformOutcome::Dropped { reason, .. } => {
            println!("dropped: {reason:?}");
            Ok(())
        }
        TransformOutcome::Failed { error, .. } => {
            Err(anyhow::Error::new(error).context("Failed to transform file"))
        }
    }
}
