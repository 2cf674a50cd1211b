//! Turns downloaded repositories into candidate [`FileDescriptor`]s.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DiscoverConfig;
use crate::contract::{DownloadedManifest, DownloadedSource, FileDescriptor, FileKind};

const DEFAULT_EXCLUDES: [&str; 4] = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
];

const SOURCE_TEST_EXCLUDES: [&str; 3] = ["**/*.test.ts", "**/*.spec.ts", "**/__tests__/**"];

/// Directories never worth descending into.
const PRUNED_DIRS: [&str; 2] = [".git", "node_modules"];

#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

fn build_globset<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
) -> Result<GlobSet, DiscoverError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| DiscoverError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| DiscoverError::Pattern {
        pattern: "<set>".to_string(),
        source,
    })
}

/// Compiled exclusion rules for one run.
pub struct Discoverer {
    excludes: GlobSet,
    source_excludes: GlobSet,
}

impl Discoverer {
    pub fn new(config: &DiscoverConfig) -> Result<Self, DiscoverError> {
        let excludes = build_globset(
            DEFAULT_EXCLUDES
                .iter()
                .copied()
                .chain(config.exclude.iter().map(String::as_str)),
        )?;
        let source_excludes = build_globset(SOURCE_TEST_EXCLUDES)?;
        Ok(Self {
            excludes,
            source_excludes,
        })
    }

    /// Candidates of every source, sources in manifest order, files sorted
    /// by relative path within a source.
    pub fn discover(&self, manifest: &DownloadedManifest) -> Vec<FileDescriptor> {
        let mut all = Vec::new();
        for source in &manifest.sources {
            let found = self.discover_source(source);
            info!(repo = %source.name, files = found.len(), "Discovered candidate files");
            all.extend(found);
        }
        info!(total_files = all.len(), "Discovery complete");
        all
    }

    pub fn discover_source(&self, source: &DownloadedSource) -> Vec<FileDescriptor> {
        let root = &source.local_path;
        if !root.is_dir() {
            warn!(repo = %source.name, path = %root.display(), "Source directory missing, skipping");
            return Vec::new();
        }

        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.depth() > 0
                && e.file_name().to_str().is_some_and(|n| PRUNED_DIRS.contains(&n)))
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(repo = %source.name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(descriptor) = self.candidate(source, root, entry.path()) {
                files.push(descriptor);
            }
        }
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        files
    }

    fn candidate(
        &self,
        source: &DownloadedSource,
        root: &Path,
        path: &Path,
    ) -> Option<FileDescriptor> {
        let inner = path.strip_prefix(root).ok()?;
        let inner = inner
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if self.excludes.is_match(&inner) {
            return None;
        }
        let descriptor = FileDescriptor::new(path, format!("{}/{inner}", source.name))?;
        if descriptor.kind == FileKind::AnnotatedSource && self.source_excludes.is_match(&inner) {
            debug!(file = %descriptor.relative_path, "Skipping test source");
            return None;
        }
        Some(descriptor)
    }
}
