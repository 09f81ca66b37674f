//! Configuration module for db-backup
//!
//! Two inputs feed a run:
//! 1. A [`BackupRequest`] built from command-line flags and environment variables
//! 2. An optional TOML settings file ([`AppConfig`]) for output, logging,
//!    notification and upload settings
//!
//! ## Example Usage
//!
//! ```no_run
//! use db_backup::config;
//!
//! let settings = config::load_config_or_default("db-backup.toml")?;
//! println!("Artifacts go to {:?}", settings.output.directory);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    load_config, load_config_or_default, validate_config, validate_request, ConfigError, Result,
};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Default location of the settings file
pub fn default_config_path() -> std::path::PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("db-backup").join("config.toml"))
        .unwrap_or_else(|| std::path::PathBuf::from("db-backup.toml"))
}
