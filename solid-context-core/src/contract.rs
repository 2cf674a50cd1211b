//! # contract: shared data model and pipeline seams
//!
//! This module defines the records that flow through the pipeline and the two
//! traits that separate the pure core from its I/O collaborators:
//!
//! - [`Downloader`]: makes the ecosystem repositories available locally and
//!   reports where they live ([`DownloadedManifest`]).
//! - [`Publisher`]: receives the generated knowledge base, one relative path
//!   and one text body at a time.
//!
//! Records, leaves first:
//!
//! ```text
//! FileDescriptor ──transform──▶ TransformedFile ──classify──▶ ClassifiedFile
//! ```
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`, so the orchestrator can be driven
//! end to end in tests without git or a real output directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::frontmatter::Frontmatter;

/// Sentinel domain written by the transformer before classification.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// The kinds of candidate files the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    Markdown,
    Mdx,
    /// TypeScript carrying `/** ... */` documentation blocks.
    AnnotatedSource,
}

impl FileKind {
    /// Resolves a file extension (without the dot). Anything else is not a candidate.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(FileKind::Markdown),
            "mdx" => Some(FileKind::Mdx),
            "ts" => Some(FileKind::AnnotatedSource),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Markdown => "md",
            FileKind::Mdx => "mdx",
            FileKind::AnnotatedSource => "ts",
        }
    }
}

/// One candidate file, as produced by discovery. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub absolute_path: PathBuf,
    /// `/`-separated path whose first segment is the repository name.
    pub relative_path: String,
    pub kind: FileKind,
    pub repo_name: String,
}

impl FileDescriptor {
    /// Builds a descriptor from a relative path, deriving the repository name
    /// from its first segment. Returns `None` for unsupported extensions.
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Option<Self> {
        let absolute_path = absolute_path.into();
        let relative_path = relative_path.into();
        let kind = Path::new(&relative_path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileKind::from_extension)?;
        let repo_name = repo_name_of(&relative_path);
        Some(Self {
            absolute_path,
            relative_path,
            kind,
            repo_name,
        })
    }

    /// Last segment of the absolute path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.absolute_path.file_name().and_then(|n| n.to_str())
    }
}

/// First `/`-separated segment of a relative path, or `"unknown"` when empty.
pub fn repo_name_of(relative_path: &str) -> String {
    relative_path
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Metadata attached to every transformed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub source_repo: String,
    pub source_path: String,
    /// [`UNKNOWN_DOMAIN`] until the classifier runs, unless set upstream.
    pub domain: String,
    pub extracted_at: DateTime<Utc>,
    pub primitive: Option<String>,
}

impl Metadata {
    pub fn new(descriptor: &FileDescriptor, extracted_at: DateTime<Utc>) -> Self {
        Self {
            source_repo: descriptor.repo_name.clone(),
            source_path: descriptor.relative_path.clone(),
            domain: UNKNOWN_DOMAIN.to_string(),
            extracted_at,
            primitive: None,
        }
    }

    /// `2025-01-01T00:00:00.000Z`
    pub fn extracted_at_rfc3339(&self) -> String {
        self.extracted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Header mapping in the fixed key order. `primitive` is only present
    /// once one has been recognised.
    pub fn to_frontmatter(&self) -> Frontmatter {
        let mut fm = Frontmatter::new();
        fm.insert("source_repo", self.source_repo.as_str());
        fm.insert("source_path", self.source_path.as_str());
        fm.insert("domain", self.domain.as_str());
        fm.insert("extracted_at", self.extracted_at_rfc3339());
        if let Some(primitive) = &self.primitive {
            fm.insert("primitive", primitive.as_str());
        }
        fm
    }
}

/// Output of the transformer: header plus Markdown body, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedFile {
    pub descriptor: FileDescriptor,
    pub content: String,
    pub metadata: Metadata,
}

/// Topical buckets of the knowledge base. Declaration order is index order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    CoreReactivity,
    Routing,
    Ssr,
    Primitives,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::CoreReactivity,
        Domain::Routing,
        Domain::Ssr,
        Domain::Primitives,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::CoreReactivity => "core-reactivity",
            Domain::Routing => "routing",
            Domain::Ssr => "ssr",
            Domain::Primitives => "primitives",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Domain::CoreReactivity => {
                "Core reactive primitives (Signals, Effects, Memos) and state management."
            }
            Domain::Routing => {
                "Routing configuration, components, and data fetching (solid-router)."
            }
            Domain::Ssr => "Server-Side Rendering, Hydration, and SolidStart framework features.",
            Domain::Primitives => "Helper primitives, utilities, and ecosystem tools.",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// Reference material versus tutorial/guide material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Api,
    Examples,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Api => "api",
            DocType::Examples => "examples",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub domain: Domain,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub primitive: Option<&'static str>,
}

/// A transformed file with exactly one domain and one type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFile {
    pub file: TransformedFile,
    pub classification: Classification,
}

impl ClassifiedFile {
    pub fn relative_path(&self) -> &str {
        &self.file.descriptor.relative_path
    }

    pub fn content(&self) -> &str {
        &self.file.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.file.metadata
    }
}

/// Error type for the Downloader trait.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to prepare sources directory {path}: {source}")]
    SourcesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Manifest returned from a download operation: every repository that is
/// available locally, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct DownloadedManifest {
    pub sources: Vec<DownloadedSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedSource {
    /// Repository name; becomes the first segment of every relative path.
    pub name: String,
    pub local_path: PathBuf,
}

/// Makes the configured repositories available on disk.
///
/// Implementations skip sources they cannot fetch; a missing repository
/// simply does not appear in the manifest.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download_all(&self) -> Result<DownloadedManifest, DownloadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to reset output directory {path}: {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination of the generated knowledge base.
///
/// Paths handed to [`Publisher::write`] are relative to the destination root
/// and use the `domain/type/filename` layout.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Name of the destination root as shown in generated summaries.
    fn root_name(&self) -> String;

    /// Removes any previous output and prepares an empty destination.
    async fn reset(&self) -> Result<(), PublishError>;

    async fn write(&self, relative_path: &Path, contents: &str) -> Result<(), PublishError>;
}
