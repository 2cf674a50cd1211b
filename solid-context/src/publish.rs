//! Filesystem [`Publisher`]: writes the knowledge base under one directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use solid_context_core::contract::{PublishError, Publisher};
use tracing::{debug, info};

pub struct DirectoryPublisher {
    root: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Publisher for DirectoryPublisher {
    fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    async fn reset(&self) -> Result<(), PublishError> {
        let reset_err = |source| PublishError::Reset {
            path: self.root.clone(),
            source,
        };
        if tokio::fs::try_exists(&self.root).await.map_err(reset_err)? {
            info!(path = %self.root.display(), "Cleaning existing output directory");
            tokio::fs::remove_dir_all(&self.root).await.map_err(reset_err)?;
        }
        tokio::fs::create_dir_all(&self.root).await.map_err(reset_err)
    }

    async fn write(&self, relative_path: &Path, contents: &str) -> Result<(), PublishError> {
        let path = self.root.join(relative_path);
        let write_err = |source| PublishError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&path, contents).await.map_err(write_err)?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote output file");
        Ok(())
    }
}
