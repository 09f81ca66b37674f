//! DB Backup Library
//!
//! Backs up a single MySQL, PostgreSQL or MongoDB database to a local
//! artifact, optionally compressed and uploaded, reporting progress through
//! desktop and webhook notifications.

pub mod config;
pub mod database;
pub mod error;
pub mod managers;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, load_config_or_default, AppConfig, BackupRequest, DatabaseKind};
pub use database::{DatabaseOperations, RealDatabaseOps};
pub use error::BackupError;
pub use managers::backup::{BackupManager, BackupOutcome, RunState};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::{BackupEvent, NotificationManager, Notifier};
pub use strategies::BackupArtifact;
