//! High-level pipeline: orchestrates download → transform → classify →
//! publish for the configured repositories.
//!
//! # Stages
//! 1. [`Downloader::download_all`] makes repositories available locally
//! 2. [`Discoverer`] lists candidate files per repository
//! 3. [`transform_all`] and [`classify_all`] process every file on its own;
//!    a bad file is dropped or falls back, the batch always completes
//! 4. [`aggregate`] groups files by domain and type; [`validate`] reports
//!    coverage and quality
//! 5. The [`Publisher`] is reset and receives every document followed by
//!    the root index, one JSON index per domain and `STRUCTURE.md`
//!
//! # Error Handling
//! Only whole-run problems are errors: the sources directory cannot be
//! prepared, an exclude pattern is invalid, validation fails in strict mode,
//! or the destination cannot be reset. Individual write failures are logged
//! and counted in the [`SynchroniseReport`].
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SynchroniseReport`], [`SyncError`]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::aggregate::{aggregate, DomainStats};
use crate::classify::{classify_all, Classifier};
use crate::config::SynchroniseConfig;
use crate::contract::{DownloadError, Domain, Downloader, PublishError, Publisher};
use crate::discover::{DiscoverError, Discoverer};
use crate::index::{
    domain_indexes, root_index, structure_summary, DOMAIN_INDEX_FILE, ROOT_INDEX_FILE,
    STRUCTURE_FILE,
};
use crate::layout::plan_layout;
use crate::transform::transform_all;
use crate::validate::{validate, ValidationReport};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
    #[error("discovery failed: {0}")]
    Discover(#[from] DiscoverError),
    #[error("validation failed: {missing} missing primitive(s), {issues} quality issue(s)")]
    Validation { missing: usize, issues: usize },
    #[error("failed to reset destination: {0}")]
    Reset(#[source] PublishError),
}

/// What one run did, stage by stage.
#[derive(Debug, Clone, Serialize)]
pub struct SynchroniseReport {
    pub repositories: usize,
    pub discovered: usize,
    pub transformed: usize,
    pub dropped: usize,
    pub failed: usize,
    pub fallback_classified: usize,
    /// Successful writes, documents and generated indexes together.
    pub written: usize,
    pub write_failures: usize,
    pub stats: BTreeMap<Domain, DomainStats>,
    pub validation: ValidationReport,
}

#[derive(Default)]
struct WriteTally {
    written: usize,
    failures: usize,
}

impl WriteTally {
    async fn write<P: Publisher>(&mut self, publisher: &P, path: &Path, contents: &str) {
        match publisher.write(path, contents).await {
            Ok(()) => {
                debug!(path = %path.display(), "[SYNC][WRITE] Wrote file");
                self.written += 1;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "[SYNC][ERROR][WRITE] Failed to write file");
                self.failures += 1;
            }
        }
    }
}

pub async fn synchronise<D, P>(
    config: &SynchroniseConfig,
    downloader: &D,
    publisher: &P,
) -> Result<SynchroniseReport, SyncError>
where
    D: Downloader,
    P: Publisher,
{
    info!("[SYNC] Starting full synchronisation pipeline");

    let manifest = downloader.download_all().await.map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Download failed");
        SyncError::from(e)
    })?;
    info!(repositories = manifest.sources.len(), "[SYNC] Download succeeded");

    let discoverer = Discoverer::new(&config.discover).map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Invalid discovery configuration");
        SyncError::from(e)
    })?;
    let descriptors = discoverer.discover(&manifest);

    let transformed = transform_all(&descriptors);
    let classifier = Classifier::new(&config.classify);
    let classified = classify_all(&classifier, transformed.files);
    let org = aggregate(classified.files);
    let stats = org.stats();
    info!(stats = ?stats, "[SYNC] Aggregation complete");

    let validation = validate(&org);
    if !validation.passed {
        if config.validation.strict {
            error!("[SYNC][ERROR] Validation failed in strict mode, nothing written");
            return Err(SyncError::Validation {
                missing: validation.completeness.missing,
                issues: validation.quality.total_issues,
            });
        }
        warn!("[SYNC] Validation failed, continuing");
    }

    publisher.reset().await.map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Failed to reset destination");
        SyncError::Reset(e)
    })?;
    info!("[SYNC] Reset destination before writing");

    let mut tally = WriteTally::default();
    for (path, file) in plan_layout(&org) {
        tally.write(publisher, &path, file.content()).await;
    }
    info!(
        documents = org.total_files(),
        written = tally.written,
        failed = tally.failures,
        "[SYNC] Documents written"
    );

    let generated_at = Utc::now();
    tally
        .write(publisher, Path::new(ROOT_INDEX_FILE), &root_index(&org, generated_at))
        .await;
    for index in domain_indexes(&org, generated_at) {
        let path = PathBuf::from(index.domain.as_str()).join(DOMAIN_INDEX_FILE);
        match serde_json::to_string_pretty(&index) {
            Ok(json) => tally.write(publisher, &path, &json).await,
            Err(e) => {
                error!(path = %path.display(), error = %e, "[SYNC][ERROR] Failed to serialise domain index");
                tally.failures += 1;
            }
        }
    }
    let summary = structure_summary(&org, &publisher.root_name(), generated_at);
    tally.write(publisher, Path::new(STRUCTURE_FILE), &summary).await;

    if tally.failures > 0 {
        warn!(failed = tally.failures, "[SYNC] Some files failed to write");
    }

    let report = SynchroniseReport {
        repositories: manifest.sources.len(),
        discovered: descriptors.len(),
        transformed: org.total_files(),
        dropped: transformed.dropped,
        failed: transformed.failed,
        fallback_classified: classified.fallbacks,
        written: tally.written,
        write_failures: tally.failures,
        stats,
        validation,
    };
    info!(
        repositories = report.repositories,
        discovered = report.discovered,
        transformed = report.transformed,
        written = report.written,
        "[SYNC] Synchronisation complete"
    );
    Ok(report)
}
