//! Error taxonomy for a backup run

use crate::config::DatabaseKind;

/// Fatal errors that end a backup run
///
/// Every variant collapses the run to the failed state. Notification failures
/// use [`NotificationError`](crate::managers::notification::NotificationError).
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Unsupported database kind '{0}' (expected one of: mysql, postgres, mongodb)")]
    UnsupportedDatabaseKind(String),

    #[error("Failed to connect to {kind} database: {message}")]
    Connection { kind: DatabaseKind, message: String },

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl BackupError {
    pub fn connection(kind: DatabaseKind, err: anyhow::Error) -> Self {
        BackupError::Connection {
            kind,
            message: format!("{:#}", err),
        }
    }

    pub fn export(err: anyhow::Error) -> Self {
        BackupError::Export(format!("{:#}", err))
    }

    pub fn compression(err: anyhow::Error) -> Self {
        BackupError::Compression(format!("{:#}", err))
    }

    pub fn upload(err: anyhow::Error) -> Self {
        BackupError::Upload(format!("{:#}", err))
    }

    /// Short stage label used in log fields
    pub fn stage(&self) -> &'static str {
        match self {
            BackupError::UnsupportedDatabaseKind(_) => "validate",
            BackupError::Connection { .. } => "connect",
            BackupError::Export(_) => "export",
            BackupError::Compression(_) => "compress",
            BackupError::Upload(_) => "upload",
        }
    }
}
