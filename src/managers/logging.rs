//! Tracing subscriber for a backup run
//!
//! Console lines go to stderr at INFO. The same events go to a daily-rolling
//! `db-backup.log` in the configured directory at the configured level.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;

const LOG_FILE_PREFIX: &str = "db-backup";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_directory: PathBuf,
    /// File layer level
    pub log_level: Level,
    /// Rotated files kept after startup
    pub max_files: u32,
}

impl LoggingConfig {
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            log_directory: settings.directory.clone(),
            log_level: parse_level(&settings.level),
            max_files: settings.max_files,
        }
    }
}

/// Unknown names fall back to INFO
fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Install the console and file layers, then prune old log files
///
/// Fails if the log directory cannot be created or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let log_dir = crate::config::expand_tilde(&config.log_directory);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &log_dir,
        format!("{}.log", LOG_FILE_PREFIX),
    );
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(level_filter(config.log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_filter(level_filter(Level::INFO));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    cleanup_old_logs(&log_dir, config.max_files)?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Initialize simple console-only logging (used when the log directory is unusable)
pub fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
}

/// Create a level filter for tracing layers
///
/// Third-party crates (drivers, HTTP) are capped at WARN unless `RUST_LOG` says otherwise.
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,db_backup={}", level)))
}

/// Delete rotated `db-backup.log*` files beyond the `keep` most recent
fn cleanup_old_logs(log_dir: &Path, keep: u32) -> Result<()> {
    let mut rotated: Vec<(Option<SystemTime>, PathBuf)> = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to list log directory: {:?}", log_dir))?
        .flatten()
        .filter(|entry| is_log_file(&entry.file_name().to_string_lossy()))
        .map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok();
            (modified, entry.path())
        })
        .collect();

    rotated.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, path) in rotated.into_iter().skip(keep as usize) {
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!("Pruned log file {:?}", path),
            Err(e) => tracing::warn!("Could not prune log file {:?}: {}", path, e),
        }
    }

    Ok(())
}

fn is_log_file(name: &str) -> bool {
    name.strip_prefix(LOG_FILE_PREFIX)
        .is_some_and(|rest| rest.starts_with(".log"))
}

/// Holds the non-blocking file writer open; pending lines are written out on drop
pub struct LogGuard {
    _file_guard: WorkerGuard,
}
