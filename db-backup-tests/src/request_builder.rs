//! Fluent API for building backup requests
//!
//! Provides a builder pattern for creating requests with sensible defaults.

use db_backup::config::BackupRequest;

/// Builder for creating test requests
pub struct RequestBuilder {
    request: BackupRequest,
}

impl RequestBuilder {
    /// Request for `db` kind label and database `dbname`, all options off
    pub fn new(db: &str, dbname: &str) -> Self {
        Self {
            request: BackupRequest {
                db: db.to_string(),
                host: "localhost".to_string(),
                port: None,
                user: "backup".to_string(),
                password: "test-password-123".to_string(),
                dbname: dbname.to_string(),
                backup_type: "full".to_string(),
                compress: false,
                cloud: false,
            },
        }
    }

    pub fn mysql(dbname: &str) -> Self {
        Self::new("mysql", dbname)
    }

    pub fn postgres(dbname: &str) -> Self {
        Self::new("postgres", dbname)
    }

    pub fn mongodb(dbname: &str) -> Self {
        Self::new("mongodb", dbname)
    }

    pub fn host(mut self, host: &str) -> Self {
        self.request.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.request.port = Some(port);
        self
    }

    pub fn credentials(mut self, user: &str, password: &str) -> Self {
        self.request.user = user.to_string();
        self.request.password = password.to_string();
        self
    }

    pub fn backup_type(mut self, backup_type: &str) -> Self {
        self.request.backup_type = backup_type.to_string();
        self
    }

    pub fn compress(mut self) -> Self {
        self.request.compress = true;
        self
    }

    pub fn cloud(mut self) -> Self {
        self.request.cloud = true;
        self
    }

    pub fn build(self) -> BackupRequest {
        self.request
    }
}
