//! Database access abstraction
//!
//! [`DatabaseOperations`] is the seam between the backup pipeline and the
//! drivers: connect, export, release. [`RealDatabaseOps`] dispatches on the
//! closed [`ConnectionHandle`] enum; [`mock::MockDatabaseOps`] records calls
//! for tests.

pub mod connector;

use crate::config::{BackupRequest, DatabaseKind};
use crate::error::BackupError;
use crate::strategies::{mongodb_export, mysql_dump, postgres_catalog, BackupArtifact};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Parameters forwarded to a driver
///
/// Only these fields ever leave the pipeline; anything else on the request
/// stays behind.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    pub fn from_request(request: &BackupRequest, kind: DatabaseKind) -> Self {
        Self {
            host: request.host.clone(),
            port: request.effective_port(kind),
            user: request.user.clone(),
            password: request.password.clone(),
            database: request.dbname.clone(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Live session to one database instance
pub enum ConnectionHandle {
    /// The dump tool reconnects with the same parameters
    Mysql {
        conn: sqlx::MySqlConnection,
        params: ConnectionParams,
    },
    Postgres {
        conn: sqlx::PgConnection,
    },
    /// Server-level client; the database is chosen at export time
    Mongodb {
        client: mongodb::Client,
    },
}

impl ConnectionHandle {
    pub fn kind(&self) -> DatabaseKind {
        match self {
            ConnectionHandle::Mysql { .. } => DatabaseKind::Mysql,
            ConnectionHandle::Postgres { .. } => DatabaseKind::Postgres,
            ConnectionHandle::Mongodb { .. } => DatabaseKind::Mongodb,
        }
    }
}

/// Abstraction for database operations, enabling mocking in tests
#[async_trait]
pub trait DatabaseOperations: Send + Sync {
    type Handle: Send;

    /// Open a session for `kind`
    async fn connect(
        &self,
        kind: DatabaseKind,
        params: &ConnectionParams,
    ) -> Result<Self::Handle, BackupError>;

    /// Write the kind-specific export of `dbname` into `destination`
    async fn export(
        &self,
        handle: &mut Self::Handle,
        dbname: &str,
        destination: &Path,
    ) -> Result<BackupArtifact, BackupError>;

    /// Close the session
    async fn release(&self, handle: Self::Handle) -> anyhow::Result<()>;
}

/// Default implementation backed by the real drivers
#[derive(Debug, Clone, Default)]
pub struct RealDatabaseOps;

impl RealDatabaseOps {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseOperations for RealDatabaseOps {
    type Handle = ConnectionHandle;

    async fn connect(
        &self,
        kind: DatabaseKind,
        params: &ConnectionParams,
    ) -> Result<ConnectionHandle, BackupError> {
        connector::connect(kind, params)
            .await
            .map_err(|e| BackupError::connection(kind, e))
    }

    async fn export(
        &self,
        handle: &mut ConnectionHandle,
        dbname: &str,
        destination: &Path,
    ) -> Result<BackupArtifact, BackupError> {
        let result = match handle {
            ConnectionHandle::Mysql { params, .. } => {
                mysql_dump::export(params, dbname, destination).await
            }
            ConnectionHandle::Postgres { conn } => {
                postgres_catalog::export(conn, dbname, destination).await
            }
            ConnectionHandle::Mongodb { client } => {
                mongodb_export::export(client, dbname, destination).await
            }
        };

        result.map_err(BackupError::export)
    }

    async fn release(&self, handle: ConnectionHandle) -> anyhow::Result<()> {
        connector::release(handle).await
    }
}

/// Connection owned by a single run
///
/// `release` consumes the guard, so a session is closed at most once. A guard
/// dropped without release (a panic mid-run) logs a warning and drops the
/// handle, which closes the driver socket.
pub struct ScopedConnection<'a, D: DatabaseOperations> {
    ops: &'a D,
    handle: Option<D::Handle>,
}

impl<'a, D: DatabaseOperations> ScopedConnection<'a, D> {
    pub fn new(ops: &'a D, handle: D::Handle) -> Self {
        Self {
            ops,
            handle: Some(handle),
        }
    }

    pub fn handle_mut(&mut self) -> &mut D::Handle {
        match self.handle.as_mut() {
            Some(handle) => handle,
            // only `release` takes the handle, and it consumes the guard
            None => unreachable!("connection used after release"),
        }
    }

    pub async fn release(mut self) -> anyhow::Result<()> {
        match self.handle.take() {
            Some(handle) => self.ops.release(handle).await,
            None => Ok(()),
        }
    }
}

impl<D: DatabaseOperations> Drop for ScopedConnection<'_, D> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("Connection dropped without release");
        }
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use crate::strategies::mongodb_export::CollectionDump;
    use crate::strategies::postgres_catalog::{render_rows, CatalogRow};
    use crate::strategies::{prepare_artifact_path, write_artifact};
    use std::sync::{Arc, Mutex};

    /// Recorded operation call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum DatabaseCall {
        Connect { kind: DatabaseKind, params: ConnectionParams },
        Export { kind: DatabaseKind, dbname: String },
        Release { kind: DatabaseKind },
    }

    /// Handle returned by the mock
    #[derive(Debug)]
    pub struct MockHandle {
        pub kind: DatabaseKind,
    }

    /// Mock database operations for testing
    ///
    /// Exports write real files using the configured fixtures, so the rest of
    /// the pipeline (compression, upload) can run against them.
    #[derive(Clone, Default)]
    pub struct MockDatabaseOps {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<DatabaseCall>>>,
        /// Dump text written for MySQL
        pub sql_dump: Arc<Mutex<String>>,
        /// Catalog rows written for PostgreSQL
        pub catalog_rows: Arc<Mutex<Vec<CatalogRow>>>,
        /// Collections written for MongoDB
        pub collections: Arc<Mutex<Vec<CollectionDump>>>,
        pub should_fail_connect: Arc<Mutex<bool>>,
        pub should_fail_export: Arc<Mutex<bool>>,
        pub should_fail_release: Arc<Mutex<bool>>,
    }

    impl MockDatabaseOps {
        pub fn new() -> Self {
            Self {
                sql_dump: Arc::new(Mutex::new(
                    "CREATE TABLE `items` (`id` int NOT NULL);\n".to_string(),
                )),
                ..Default::default()
            }
        }

        /// Configure the MySQL dump text
        pub fn with_sql_dump(self, dump: &str) -> Self {
            *self.sql_dump.lock().unwrap() = dump.to_string();
            self
        }

        /// Configure the PostgreSQL catalog rows
        pub fn with_catalog_rows(self, rows: Vec<CatalogRow>) -> Self {
            *self.catalog_rows.lock().unwrap() = rows;
            self
        }

        /// Configure the MongoDB collections
        pub fn with_collections(self, collections: Vec<CollectionDump>) -> Self {
            *self.collections.lock().unwrap() = collections;
            self
        }

        /// Configure connect to fail (connection refused)
        pub fn with_failing_connect(self) -> Self {
            *self.should_fail_connect.lock().unwrap() = true;
            self
        }

        /// Configure export to fail
        pub fn with_failing_export(self) -> Self {
            *self.should_fail_export.lock().unwrap() = true;
            self
        }

        /// Configure release to fail
        pub fn with_failing_release(self) -> Self {
            *self.should_fail_release.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<DatabaseCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn connect_count(&self) -> usize {
            self.count(|c| matches!(c, DatabaseCall::Connect { .. }))
        }

        pub fn export_count(&self) -> usize {
            self.count(|c| matches!(c, DatabaseCall::Export { .. }))
        }

        pub fn release_count(&self) -> usize {
            self.count(|c| matches!(c, DatabaseCall::Release { .. }))
        }

        fn count(&self, predicate: impl Fn(&DatabaseCall) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
        }

        fn record(&self, call: DatabaseCall) {
            self.calls.lock().unwrap().push(call);
        }

        async fn write_fixture(
            &self,
            kind: DatabaseKind,
            dbname: &str,
            destination: &Path,
        ) -> anyhow::Result<BackupArtifact> {
            match kind {
                DatabaseKind::Mysql => {
                    let dump = self.sql_dump.lock().unwrap().clone();
                    let path = prepare_artifact_path(destination, dbname, kind.artifact_extension()).await?;
                    write_artifact(&path, dump.as_bytes()).await?;
                    Ok(BackupArtifact::raw(path, kind))
                }
                DatabaseKind::Postgres => {
                    let rows = self.catalog_rows.lock().unwrap().clone();
                    let body = render_rows(&rows)?;
                    let path = prepare_artifact_path(destination, dbname, kind.artifact_extension()).await?;
                    write_artifact(&path, body.as_bytes()).await?;
                    Ok(BackupArtifact::raw(path, kind))
                }
                DatabaseKind::Mongodb => {
                    let collections = self.collections.lock().unwrap().clone();
                    mongodb_export::write_export(&collections, dbname, destination).await
                }
            }
        }
    }

    #[async_trait]
    impl DatabaseOperations for MockDatabaseOps {
        type Handle = MockHandle;

        async fn connect(
            &self,
            kind: DatabaseKind,
            params: &ConnectionParams,
        ) -> Result<MockHandle, BackupError> {
            self.record(DatabaseCall::Connect {
                kind,
                params: params.clone(),
            });

            if *self.should_fail_connect.lock().unwrap() {
                return Err(BackupError::connection(
                    kind,
                    anyhow::anyhow!("Connection refused (os error 111)"),
                ));
            }

            Ok(MockHandle { kind })
        }

        async fn export(
            &self,
            handle: &mut MockHandle,
            dbname: &str,
            destination: &Path,
        ) -> Result<BackupArtifact, BackupError> {
            self.record(DatabaseCall::Export {
                kind: handle.kind,
                dbname: dbname.to_string(),
            });

            if *self.should_fail_export.lock().unwrap() {
                return Err(BackupError::Export("Mock export failure".to_string()));
            }

            self.write_fixture(handle.kind, dbname, destination)
                .await
                .map_err(BackupError::export)
        }

        async fn release(&self, handle: MockHandle) -> anyhow::Result<()> {
            self.record(DatabaseCall::Release { kind: handle.kind });

            if *self.should_fail_release.lock().unwrap() {
                anyhow::bail!("Mock release failure");
            }

            Ok(())
        }
    }
}
