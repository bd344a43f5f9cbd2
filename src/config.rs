//! Configuration module for loading and parsing TOML configuration files.

use crate::auth::DEFAULT_TOKEN_TTL_MINUTES;
use crate::store::DEFAULT_LOCK_TIMEOUT;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Account table configuration.
    pub store: StoreConfig,
    /// Token and login configuration.
    pub auth: AuthConfig,
    /// Session and random number log database.
    pub database: DatabaseConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Account table configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the CSV backing file.
    pub path: PathBuf,
    /// Maximum time a mutation waits for the file lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl StoreConfig {
    /// Lock timeout as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/accounts.csv"),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
        }
    }
}

/// Token and login configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens.
    pub secret: String,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: i64,
    /// Allowed users. When empty, any credentials are accepted.
    pub users: Vec<UserConfig>,
}

/// Placeholder secret; a warning is logged when it is in use.
pub const DEFAULT_SECRET: &str = "change-me";

impl AuthConfig {
    /// Whether the placeholder secret is still configured.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            users: Vec::new(),
        }
    }
}

/// A user allowed to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Username.
    pub username: String,
    /// Hex SHA-256 digest of the password.
    pub password_sha256: String,
}

/// Session log database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Whether the session and random number logs are enabled.
    pub enabled: bool,
    /// SQLite connection string.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "sqlite://data/app.db".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `HOST`, `PORT` and `TOKEN_SECRET` overrides.
    ///
    /// # Errors
    /// Returns error if an override is not a valid value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT must be a number: {port}")))?;
        }
        if let Some(secret) = lookup("TOKEN_SECRET") {
            self.auth.secret = secret;
        }
        self.validate()
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "store path cannot be empty".to_string(),
            ));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "store lock_timeout_ms must be positive".to_string(),
            ));
        }
        if self.auth.secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth secret cannot be empty".to_string(),
            ));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth token_ttl_minutes must be positive".to_string(),
            ));
        }
        for user in &self.auth.users {
            if user.username.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "auth user name cannot be empty".to_string(),
                ));
            }
            let digest = &user.password_sha256;
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidValue(format!(
                    "auth user {} password_sha256 must be 64 hex characters",
                    user.username
                )));
            }
        }

        Ok(())
    }
}
