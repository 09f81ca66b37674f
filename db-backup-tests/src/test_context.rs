//! Test context and harness for pipeline testing
//!
//! Provides a unified context for setting up and tearing down test environments.

use anyhow::{Context, Result};
use db_backup::database::DatabaseOperations;
use db_backup::managers::backup::BackupManager;
use db_backup::managers::notification::mock::RecordingNotifier;
use db_backup::managers::upload::{LocalDirectoryUploader, LogOnlyUploader, Uploader};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
    /// Notifier shared with every manager built from this context
    notifier: RecordingNotifier,
}

impl TestContext {
    /// Create a new test context with a temporary directory
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            notifier: RecordingNotifier::new(),
        }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory artifacts are written to
    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("artifacts")
    }

    /// Directory the local upload store copies into
    pub fn mirror_dir(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    pub fn notifier(&self) -> &RecordingNotifier {
        &self.notifier
    }

    /// Manager writing to [`Self::output_dir`] with a log-only upload store
    pub fn manager<D: DatabaseOperations>(&self, ops: D) -> BackupManager<D> {
        self.manager_with_uploader(ops, Box::new(LogOnlyUploader))
    }

    /// Manager that mirrors uploads into [`Self::mirror_dir`]
    pub fn mirroring_manager<D: DatabaseOperations>(&self, ops: D) -> BackupManager<D> {
        self.manager_with_uploader(ops, Box::new(LocalDirectoryUploader::new(self.mirror_dir())))
    }

    pub fn manager_with_uploader<D: DatabaseOperations>(
        &self,
        ops: D,
        uploader: Box<dyn Uploader>,
    ) -> BackupManager<D> {
        BackupManager::new(
            ops,
            Arc::new(self.notifier.clone()),
            uploader,
            self.output_dir(),
        )
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Names of the files in the output directory, sorted
    pub fn artifact_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Read a file from the output directory
    pub fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.output_dir().join(name);
        std::fs::read(&path).with_context(|| format!("Failed to read {:?}", path))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries of a zip archive as (name, contents)
pub fn read_zip_entries(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut archive = zip::ZipArchive::new(file).context("Not a zip archive")?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        entries.push((entry.name().to_string(), contents));
    }
    Ok(entries)
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and the error message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Display> ResultAssertions<T> for std::result::Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = e.to_string();
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}
