//! Upload stage
//!
//! Remote stores are pluggable by [`StoreKind`]. No object-storage transport
//! exists yet; the default store only records the intent.

use crate::config::{StoreKind, UploadConfig};
use crate::error::BackupError;
use crate::strategies::BackupArtifact;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

#[async_trait]
pub trait Uploader: Send + Sync {
    fn store(&self) -> StoreKind;

    async fn upload(&self, artifact: &BackupArtifact) -> Result<(), BackupError>;
}

/// Create the uploader selected in settings
pub fn uploader_for(config: &UploadConfig) -> Result<Box<dyn Uploader>> {
    match config.store {
        StoreKind::Log => Ok(Box::new(LogOnlyUploader)),
        StoreKind::Local => {
            let directory = config
                .directory
                .clone()
                .context("upload.directory is required for the local store")?;
            Ok(Box::new(LocalDirectoryUploader::new(directory)))
        }
    }
}

/// Logs what would be uploaded
pub struct LogOnlyUploader;

#[async_trait]
impl Uploader for LogOnlyUploader {
    fn store(&self) -> StoreKind {
        StoreKind::Log
    }

    async fn upload(&self, artifact: &BackupArtifact) -> Result<(), BackupError> {
        info!(
            "Cloud upload requested for {:?}; no remote store configured, skipping transfer",
            artifact.path
        );
        Ok(())
    }
}

/// Copies artifacts into a mirror directory
pub struct LocalDirectoryUploader {
    directory: PathBuf,
}

impl LocalDirectoryUploader {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    async fn copy(&self, artifact: &BackupArtifact) -> Result<PathBuf> {
        let file_name = artifact
            .path
            .file_name()
            .context("Artifact path has no file name")?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create upload directory: {:?}", self.directory))?;

        let target = self.directory.join(file_name);
        tokio::fs::copy(&artifact.path, &target)
            .await
            .with_context(|| format!("Failed to copy {:?} to {:?}", artifact.path, target))?;

        Ok(target)
    }
}

#[async_trait]
impl Uploader for LocalDirectoryUploader {
    fn store(&self) -> StoreKind {
        StoreKind::Local
    }

    async fn upload(&self, artifact: &BackupArtifact) -> Result<(), BackupError> {
        let target = self.copy(artifact).await.map_err(BackupError::upload)?;
        info!("Uploaded {:?} to {:?}", artifact.path, target);
        Ok(())
    }
}
