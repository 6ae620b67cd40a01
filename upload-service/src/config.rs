use std::str::FromStr;

use shared::database::DatabaseConfig;
use shared::observability::LogFormat;
use thiserror::Error;

use crate::storage::CloudinaryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cloudinary: CloudinaryConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_size_mb: usize,
}

const BYTES_PER_MB: usize = 1024 * 1024;

impl ServerConfig {
    /// Request body cap in bytes. `validate` rejects sizes that overflow.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVar(key));

        let defaults = CloudinaryConfig::default();

        let config = Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 5000)?,
                max_upload_size_mb: parse_or(&lookup, "MAX_UPLOAD_SIZE_MB", 50)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                connection_timeout: parse_or(&lookup, "DATABASE_CONNECTION_TIMEOUT", 30)?,
                ..Default::default()
            },
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                api_base: lookup("CLOUDINARY_API_BASE").unwrap_or(defaults.api_base),
                timeout_seconds: parse_or(
                    &lookup,
                    "CLOUDINARY_TIMEOUT_SECONDS",
                    defaults.timeout_seconds,
                )?,
            },
            log_format: match lookup("LOG_FORMAT") {
                Some(value) => value
                    .parse::<LogFormat>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "LOG_FORMAT",
                        value,
                    })?,
                None => LogFormat::Pretty,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("PORT must be > 0".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "DATABASE_MAX_CONNECTIONS must be > 0".to_string(),
            ));
        }

        if self.server.max_upload_size_mb == 0 {
            return Err(ConfigError::Invalid(
                "MAX_UPLOAD_SIZE_MB must be > 0".to_string(),
            ));
        }

        if self.server.max_upload_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(ConfigError::Invalid(format!(
                "MAX_UPLOAD_SIZE_MB is too large: {}",
                self.server.max_upload_size_mb
            )));
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
