use super::types::*;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate settings from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&contents)?;
    expand_paths(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Load settings if the file exists, otherwise fall back to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}

fn expand_paths(config: &mut AppConfig) {
    config.output.directory = super::expand_tilde(&config.output.directory);
    config.logging.directory = super::expand_tilde(&config.logging.directory);
    if let Some(ref dir) = config.upload.directory {
        config.upload.directory = Some(super::expand_tilde(dir));
    }
}

/// Validate the settings
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.logging.max_files == 0 {
        return Err(ConfigError::ValidationError(
            "logging.max_files must be at least 1".to_string(),
        ));
    }

    let webhook = &config.notifications.discord_webhook_url;
    if !webhook.is_empty() && !webhook.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "notifications.discord_webhook_url must be an https URL: {}",
            webhook
        )));
    }

    if config.upload.store == StoreKind::Local && config.upload.directory.is_none() {
        return Err(ConfigError::ValidationError(
            "upload.store = \"local\" requires upload.directory".to_string(),
        ));
    }

    Ok(())
}

/// Validate the shape of a request (the database kind is checked by the pipeline)
pub fn validate_request(request: &BackupRequest) -> Result<()> {
    if request.dbname.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Database name must not be empty".to_string(),
        ));
    }

    if request.dbname.contains(['/', '\\']) || request.dbname.contains("..") {
        return Err(ConfigError::ValidationError(format!(
            "Database name must not contain path separators: {}",
            request.dbname
        )));
    }

    if request.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Host must not be empty".to_string(),
        ));
    }

    if request.port == Some(0) {
        return Err(ConfigError::ValidationError(
            "Port must be between 1 and 65535".to_string(),
        ));
    }

    Ok(())
}
