//! Per-file transformation: read, normalise or extract, attach metadata.
//!
//! Each file produces a [`TransformOutcome`]. Nothing here returns an error
//! across the file boundary; the batch driver [`transform_all`] counts drops
//! and failures and keeps going.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::comments;
use crate::contract::{FileDescriptor, FileKind, Metadata, TransformedFile};
use crate::frontmatter::{self, Frontmatter};
use crate::normalize::normalize;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a file was deliberately left out. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Annotated source without a single non-empty `/** ... */` block.
    NoDocumentation,
}

#[derive(Debug)]
pub enum TransformOutcome {
    Transformed(TransformedFile),
    Dropped {
        descriptor: FileDescriptor,
        reason: DropReason,
    },
    Failed {
        descriptor: FileDescriptor,
        error: TransformError,
    },
}

impl TransformOutcome {
    pub fn into_file(self) -> Option<TransformedFile> {
        match self {
            TransformOutcome::Transformed(file) => Some(file),
            _ => None,
        }
    }
}

/// Transforms one file, stamping it with the current time.
pub fn transform(descriptor: &FileDescriptor) -> TransformOutcome {
    transform_at(descriptor, Utc::now())
}

pub fn transform_at(descriptor: &FileDescriptor, extracted_at: DateTime<Utc>) -> TransformOutcome {
    let raw = match std::fs::read_to_string(&descriptor.absolute_path) {
        Ok(raw) => raw,
        Err(source) => {
            let error = TransformError::Read {
                path: descriptor.absolute_path.clone(),
                source,
            };
            error!(file = %descriptor.relative_path, error = %error, "Failed to transform file");
            return TransformOutcome::Failed {
                descriptor: descriptor.clone(),
                error,
            };
        }
    };

    match transform_text(descriptor, &raw, extracted_at) {
        Some(file) => TransformOutcome::Transformed(file),
        None => {
            warn!(file = %descriptor.relative_path, "No JSDoc found in TypeScript file");
            TransformOutcome::Dropped {
                descriptor: descriptor.clone(),
                reason: DropReason::NoDocumentation,
            }
        }
    }
}

/// The pure part of [`transform_at`]: `None` means the file is dropped.
pub fn transform_text(
    descriptor: &FileDescriptor,
    raw: &str,
    extracted_at: DateTime<Utc>,
) -> Option<TransformedFile> {
    let metadata = Metadata::new(descriptor, extracted_at);

    let body = match descriptor.kind {
        FileKind::Mdx => {
            debug!(file = %descriptor.relative_path, "Normalizing MDX file");
            normalize(raw)
        }
        FileKind::AnnotatedSource => {
            debug!(file = %descriptor.relative_path, "Extracting JSDoc from TypeScript file");
            let docs = comments::extract(raw);
            if docs.is_empty() {
                return None;
            }
            docs
        }
        FileKind::Markdown => raw.to_string(),
    };

    let content = stamp_header(&body, &metadata);
    Some(TransformedFile {
        descriptor: descriptor.clone(),
        content,
        metadata,
    })
}

/// Replaces any leading header of `text` with the existing header merged
/// under `metadata` (metadata wins), followed by a blank line and the body.
/// The body is kept byte for byte.
pub(crate) fn stamp_header(text: &str, metadata: &Metadata) -> String {
    let decoded = frontmatter::decode(text);
    render(decoded.header, decoded.body, metadata)
}

/// Like [`stamp_header`] for text that [`stamp_header`] already produced:
/// the blank line written after the previous header is dropped, so stamping
/// again only changes the header.
pub(crate) fn restamp_header(text: &str, metadata: &Metadata) -> String {
    let decoded = frontmatter::decode(text);
    let body = match decoded.header {
        Some(_) => decoded
            .body
            .strip_prefix("\r\n")
            .or_else(|| decoded.body.strip_prefix('\n'))
            .unwrap_or(decoded.body),
        None => decoded.body,
    };
    render(decoded.header, body, metadata)
}

fn render(header: Option<Frontmatter>, body: &str, metadata: &Metadata) -> String {
    let mut header = header.unwrap_or_default();
    header.merge(&metadata.to_frontmatter());
    format!("{}\n\n{}", frontmatter::encode(&header), body)
}

/// Transformed records plus drop/failure counts, in input order.
#[derive(Debug, Default)]
pub struct TransformBatch {
    pub files: Vec<TransformedFile>,
    pub dropped: usize,
    pub failed: usize,
}

pub fn transform_all(descriptors: &[FileDescriptor]) -> TransformBatch {
    info!(total_files = descriptors.len(), "Starting file transformation");
    let mut batch = TransformBatch::default();
    for descriptor in descriptors {
        match transform(descriptor) {
            TransformOutcome::Transformed(file) => batch.files.push(file),
            TransformOutcome::Dropped { .. } => batch.dropped += 1,
            TransformOutcome::Failed { .. } => batch.failed += 1,
        }
    }
    info!(
        total = descriptors.len(),
        successful = batch.files.len(),
        dropped = batch.dropped,
        failed = batch.failed,
        "File transformation complete"
    );
    batch
}
