//! Test utilities for db-backup
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the db-backup pipeline and CLI.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{RequestBuilder, TestContext, MockDatabaseOps};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let ctx = TestContext::new();
//!     let request = RequestBuilder::mysql("shop").compress().build();
//!     let manager = ctx.manager(MockDatabaseOps::new());
//!     // ... test code
//! }
//! ```

pub mod fixtures;
pub mod request_builder;
pub mod test_context;

// Re-export commonly used items
pub use fixtures::*;
pub use request_builder::RequestBuilder;
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use db_backup::config::{AppConfig, BackupRequest, DatabaseKind, StoreKind, UploadConfig};
pub use db_backup::error::BackupError;
pub use db_backup::managers::backup::{BackupManager, BackupOutcome, RunState};
pub use db_backup::managers::notification::BackupEvent;
pub use db_backup::strategies::{ArtifactStage, BackupArtifact};

// Re-export mock implementations from the main crate
pub use db_backup::database::mock::{DatabaseCall, MockDatabaseOps};
pub use db_backup::database::DatabaseOperations;
pub use db_backup::managers::notification::mock::{RecordingNotifier, RecordingSink};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
