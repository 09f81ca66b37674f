//! Backup manager - orchestrates one backup run
//!
//! Connect -> export -> (compress) -> (upload), with a notification on start
//! and on the terminal state, and the connection released exactly once.

use crate::config::{BackupRequest, DatabaseKind};
use crate::database::{ConnectionParams, DatabaseOperations, ScopedConnection};
use crate::error::BackupError;
use crate::managers::notification::{BackupEvent, Notifier};
use crate::managers::upload::Uploader;
use crate::strategies::{artifact_path, BackupArtifact, COMPRESSED_EXTENSION};
use crate::utils::compress::compress_file;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Pipeline states of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Connected,
    Exporting,
    Compressing,
    Uploading,
    Completed,
    Failed,
}

/// Terminal result of a run
#[derive(Debug)]
pub enum BackupOutcome {
    Success { artifacts: Vec<BackupArtifact> },
    Failure { error: BackupError },
}

impl BackupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BackupOutcome::Success { .. })
    }

    pub fn into_result(self) -> Result<Vec<BackupArtifact>, BackupError> {
        match self {
            BackupOutcome::Success { artifacts } => Ok(artifacts),
            BackupOutcome::Failure { error } => Err(error),
        }
    }
}

/// State of the run in progress
struct RunTracker {
    dbname: String,
    state: RunState,
    history: Vec<RunState>,
}

impl RunTracker {
    fn new(dbname: &str) -> Self {
        Self {
            dbname: dbname.to_string(),
            state: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    fn transition(&mut self, next: RunState) {
        if next == RunState::Failed {
            error!("[{}] {:?} -> {:?}", self.dbname, self.state, next);
        } else {
            info!("[{}] {:?} -> {:?}", self.dbname, self.state, next);
        }
        self.state = next;
        self.history.push(next);
    }
}

pub struct BackupManager<D: DatabaseOperations> {
    db: D,
    notifier: Arc<dyn Notifier>,
    uploader: Box<dyn Uploader>,
    output_dir: PathBuf,
}

impl<D: DatabaseOperations> BackupManager<D> {
    pub fn new(
        db: D,
        notifier: Arc<dyn Notifier>,
        uploader: Box<dyn Uploader>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            notifier,
            uploader,
            output_dir,
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Run one backup to completion or failure
    pub async fn run(&self, request: &BackupRequest) -> BackupOutcome {
        self.run_traced(request).await.0
    }

    /// Run one backup and also return the visited states
    pub async fn run_traced(&self, request: &BackupRequest) -> (BackupOutcome, Vec<RunState>) {
        let start_time = Instant::now();
        let mut tracker = RunTracker::new(&request.dbname);

        let outcome = match self.execute(request, &mut tracker).await {
            Ok(artifacts) => {
                tracker.transition(RunState::Completed);
                let paths: Vec<String> = artifacts
                    .iter()
                    .map(|a| a.path.display().to_string())
                    .collect();
                info!(
                    "Backup of '{}' completed in {:.2}s: {}",
                    request.dbname,
                    start_time.elapsed().as_secs_f64(),
                    paths.join(", ")
                );
                self.notifier.notify(
                    BackupEvent::Completed,
                    &format!("Backup of '{}' saved to {}", request.dbname, paths.join(", ")),
                );
                BackupOutcome::Success { artifacts }
            }
            Err(e) => {
                tracker.transition(RunState::Failed);
                error!(
                    stage = e.stage(),
                    "Backup of '{}' failed after {:.2}s: {}",
                    request.dbname,
                    start_time.elapsed().as_secs_f64(),
                    e
                );
                self.notifier.notify(BackupEvent::Failed, &e.to_string());
                BackupOutcome::Failure { error: e }
            }
        };

        (outcome, tracker.history)
    }

    async fn execute(
        &self,
        request: &BackupRequest,
        tracker: &mut RunTracker,
    ) -> Result<Vec<BackupArtifact>, BackupError> {
        tracker.transition(RunState::Connecting);
        let kind = request.kind()?;

        if !request.backup_type.eq_ignore_ascii_case("full") {
            info!(
                "Backup type '{}' is advisory; performing a full export",
                request.backup_type
            );
        }

        let params = ConnectionParams::from_request(request, kind);
        let handle = self.db.connect(kind, &params).await?;
        tracker.transition(RunState::Connected);

        self.notifier.notify(
            BackupEvent::Started,
            &format!("Backing up {} database '{}'", kind, request.dbname),
        );

        let mut connection = ScopedConnection::new(&self.db, handle);
        let result = self
            .run_stages(connection.handle_mut(), kind, request, tracker)
            .await;

        if let Err(e) = connection.release().await {
            warn!("Failed to release {} connection: {:#}", kind, e);
        }

        result
    }

    async fn run_stages(
        &self,
        handle: &mut D::Handle,
        kind: DatabaseKind,
        request: &BackupRequest,
        tracker: &mut RunTracker,
    ) -> Result<Vec<BackupArtifact>, BackupError> {
        tracker.transition(RunState::Exporting);
        let raw = self
            .db
            .export(handle, &request.dbname, &self.output_dir)
            .await?;
        info!("Export written to {:?}", raw.path);

        let mut artifacts = vec![raw];

        if request.compress {
            tracker.transition(RunState::Compressing);
            let target = artifact_path(&self.output_dir, &request.dbname, COMPRESSED_EXTENSION);
            let compressed = compress_artifact(&artifacts[0], target, kind).await?;
            artifacts.push(compressed);
        }

        if request.cloud {
            tracker.transition(RunState::Uploading);
            if let Some(latest) = artifacts.last() {
                self.uploader.upload(latest).await?;
            }
        }

        Ok(artifacts)
    }
}

async fn compress_artifact(
    source: &BackupArtifact,
    target: PathBuf,
    kind: DatabaseKind,
) -> Result<BackupArtifact, BackupError> {
    let source_path = source.path.clone();
    let target_path = target.clone();

    tokio::task::spawn_blocking(move || compress_file(&source_path, &target_path))
        .await
        .map_err(|e| BackupError::Compression(format!("Compression task failed: {}", e)))?
        .map_err(BackupError::compression)?;

    Ok(BackupArtifact::compressed(target, kind))
}
