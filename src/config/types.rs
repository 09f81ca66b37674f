use crate::error::BackupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Database family a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Mysql,
    Postgres,
    Mongodb,
}

/// Export algorithm used for a database kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStrategy {
    /// Schema and data through the native dump tool
    FullDump,
    /// Table metadata from the public schema catalog only
    Catalog,
    /// Every collection materialized as JSON
    Document,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 3] = [
        DatabaseKind::Mysql,
        DatabaseKind::Postgres,
        DatabaseKind::Mongodb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Mongodb => "mongodb",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseKind::Mysql => 3306,
            DatabaseKind::Postgres => 5432,
            DatabaseKind::Mongodb => 27017,
        }
    }

    pub fn strategy(&self) -> ExportStrategy {
        match self {
            DatabaseKind::Mysql => ExportStrategy::FullDump,
            DatabaseKind::Postgres => ExportStrategy::Catalog,
            DatabaseKind::Mongodb => ExportStrategy::Document,
        }
    }

    /// Extension of the raw export artifact
    pub fn artifact_extension(&self) -> &'static str {
        match self.strategy() {
            ExportStrategy::FullDump | ExportStrategy::Catalog => "sql",
            ExportStrategy::Document => "json",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(DatabaseKind::Mysql),
            "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "mongodb" | "mongo" => Ok(DatabaseKind::Mongodb),
            _ => Err(BackupError::UnsupportedDatabaseKind(s.to_string())),
        }
    }
}

/// Input record for one backup run
///
/// `db` is kept as the raw label so that an unsupported value is rejected by
/// the pipeline itself, before any connection attempt.
#[derive(Clone)]
pub struct BackupRequest {
    pub db: String,
    pub host: String,
    /// Falls back to the kind's standard port
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Advisory label (full, incremental, ...), not acted on
    pub backup_type: String,
    pub compress: bool,
    pub cloud: bool,
}

impl BackupRequest {
    pub fn kind(&self) -> Result<DatabaseKind, BackupError> {
        self.db.parse()
    }

    pub fn effective_port(&self, kind: DatabaseKind) -> u16 {
        self.port.unwrap_or_else(|| kind.default_port())
    }
}

impl fmt::Debug for BackupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupRequest")
            .field("db", &self.db)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("backup_type", &self.backup_type)
            .field("compress", &self.compress)
            .field("cloud", &self.cloud)
            .finish()
    }
}

/// Settings file structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Where artifacts are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_max_files")]
    pub max_files: u32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: default_log_level(),
            max_files: default_log_max_files(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Send OS-level desktop notifications
    #[serde(default = "default_desktop")]
    pub desktop: bool,

    /// Optional Discord webhook receiving the same events
    #[serde(default)]
    pub discord_webhook_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: default_desktop(),
            discord_webhook_url: String::new(),
        }
    }
}

/// Remote store selection for the upload stage
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub store: StoreKind,

    /// Target directory for the `local` store
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// No transport, only records the intent
    #[default]
    Log,
    /// Copy into a mirror directory
    Local,
}

// Default value functions

fn default_output_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("db-backups"))
        .unwrap_or_else(|| PathBuf::from("db-backups"))
}

fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("db-backup").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_desktop() -> bool { true }
