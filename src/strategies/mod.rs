//! Export strategies, one per database kind
//!
//! - [`mysql_dump`]: full schema and data through `mysqldump`
//! - [`postgres_catalog`]: public schema table catalog (metadata only)
//! - [`mongodb_export`]: every collection as one JSON document
//!
//! All strategies write `<dbname>-backup.<ext>` into the destination directory,
//! overwriting any previous artifact of the same name.

pub mod mongodb_export;
pub mod mysql_dump;
pub mod postgres_catalog;

use crate::config::DatabaseKind;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extension used for compressed artifacts
pub const COMPRESSED_EXTENSION: &str = "zip";

/// Pipeline stage that produced an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStage {
    RawExport,
    Compressed,
}

/// A file produced by a backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub kind: DatabaseKind,
    pub stage: ArtifactStage,
}

impl BackupArtifact {
    pub fn raw(path: PathBuf, kind: DatabaseKind) -> Self {
        Self {
            path,
            kind,
            stage: ArtifactStage::RawExport,
        }
    }

    pub fn compressed(path: PathBuf, kind: DatabaseKind) -> Self {
        Self {
            path,
            kind,
            stage: ArtifactStage::Compressed,
        }
    }
}

/// `<dir>/<dbname>-backup.<extension>`
pub fn artifact_path(dir: &Path, dbname: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}-backup.{}", dbname, extension))
}

/// Create the destination directory if needed and return the artifact path
pub async fn prepare_artifact_path(dir: &Path, dbname: &str, extension: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    Ok(artifact_path(dir, dbname, extension))
}

/// Write artifact contents and flush them to disk
pub async fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {:?}", path))?;
    file.write_all(contents)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    file.sync_all()
        .await
        .with_context(|| format!("Failed to flush {:?}", path))?;
    Ok(())
}
