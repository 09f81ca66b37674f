use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use db_backup::config::{self, BackupRequest};
use db_backup::managers::backup::BackupManager;
use db_backup::managers::desktop::{platform_sink, Platform};
use db_backup::managers::logging::{self, LoggingConfig};
use db_backup::managers::notification::NotificationManager;
use db_backup::managers::upload::uploader_for;
use db_backup::RealDatabaseOps;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How long to wait for notifications still in flight before exiting
const NOTIFICATION_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "db-backup")]
#[command(about = "Back up a MySQL, PostgreSQL or MongoDB database", long_about = None)]
#[command(version)]
struct Cli {
    /// Database kind (mysql, postgres, mongodb)
    #[arg(long, env = "DB_TYPE")]
    db: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    host: String,

    /// Database port (defaults to the kind's standard port)
    #[arg(long, env = "DB_PORT")]
    port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "")]
    user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true, hide = true)]
    password: String,

    /// Name of the database to back up
    #[arg(long, env = "DB_NAME")]
    dbname: String,

    /// Backup type label (only full exports are performed)
    #[arg(long = "type", env = "BACKUP_TYPE", default_value = "full")]
    backup_type: String,

    /// Compress the export into a zip archive
    #[arg(long, env = "BACKUP_COMPRESS", value_parser = BoolishValueParser::new())]
    compress: bool,

    /// Upload the final artifact to the configured store
    #[arg(long, env = "BACKUP_CLOUD", value_parser = BoolishValueParser::new())]
    cloud: bool,

    /// Directory for backup artifacts (overrides the settings file)
    #[arg(long, env = "BACKUP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path to the settings file
    #[arg(short, long, env = "DB_BACKUP_CONFIG")]
    config: Option<PathBuf>,

    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,
}

impl Cli {
    fn request(&self) -> BackupRequest {
        BackupRequest {
            db: self.db.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            dbname: self.dbname.clone(),
            backup_type: self.backup_type.clone(),
            compress: self.compress,
            cloud: self.cloud,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let request = cli.request();
    config::validate_request(&request)?;

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut settings = config::load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load settings from {:?}", config_path))?;

    if let Some(ref dir) = cli.output_dir {
        settings.output.directory = config::expand_tilde(dir);
    }
    if cli.no_notify {
        settings.notifications.desktop = false;
    }

    // Keep the guard alive until exit so buffered log lines reach the file
    let _log_guard = match logging::init_logging(&LoggingConfig::from_settings(&settings.logging)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging();
            warn!("File logging unavailable, using console only: {:#}", e);
            None
        }
    };

    let notifications = Arc::new(NotificationManager::new(
        &settings.notifications,
        platform_sink(Platform::detect()),
    ));
    let uploader = uploader_for(&settings.upload)?;

    let backup_manager = BackupManager::new(
        RealDatabaseOps::new(),
        notifications.clone(),
        uploader,
        settings.output.directory.clone(),
    );

    let outcome = backup_manager.run(&request).await;
    notifications.flush(NOTIFICATION_FLUSH_TIMEOUT).await;

    let artifacts = outcome.into_result()?;
    for artifact in &artifacts {
        println!("{}", artifact.path.display());
    }

    Ok(())
}
