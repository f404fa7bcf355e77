//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use chrono::FixedOffset;
use serde::Deserialize;

/// Which document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `STORE_BACKEND` (optional): `postgres` or `memory`, defaults to `postgres`
/// - `DATABASE_URL` (required for postgres): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8080
/// - `ALLOW_ORIGINS` (optional): comma-separated CORS origins, `*` allows any
/// - `KEY_UTC_OFFSET_MINUTES` (optional): time zone of the request date key, defaults to 0
/// - `LOG_FORMAT` (optional): `pretty` or `json`
/// - `SEED_API_KEYS` (optional, memory only): comma-separated API keys
/// - `SEED_ACCEPTING` (optional, memory only): initial intake switch, defaults to true
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_backend: StoreBackend,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub allow_origins: String,

    #[serde(default)]
    pub key_utc_offset_minutes: i32,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub seed_api_keys: String,

    #[serde(default = "default_seed_accepting")]
    pub seed_accepting: bool,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    8080
}

fn default_seed_accepting() -> bool {
    true
}

/// Configuration that parsed but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("DATABASE_URL is required when STORE_BACKEND=postgres")]
    MissingDatabaseUrl,

    #[error("KEY_UTC_OFFSET_MINUTES={0} is outside -1439..=1439")]
    InvalidOffset(i32),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment variable values cannot be parsed into expected types
    /// - `DATABASE_URL` is missing for the postgres backend
    /// - The key offset is not a valid time zone offset
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        self.key_offset()?;
        Ok(())
    }

    /// Time zone used to compute the `key` of new requests.
    pub fn key_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.key_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.key_utc_offset_minutes))
    }

    /// CORS origins, empty when none are configured.
    pub fn allowed_origins(&self) -> Vec<String> {
        split_list(&self.allow_origins)
    }

    pub fn seed_api_keys(&self) -> Vec<String> {
        split_list(&self.seed_api_keys)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
    }

    #[test]
    fn defaults_apply() {
        let config = parse(&[("database_url", "postgres://localhost/songs")]).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.allowed_origins().is_empty());
        assert!(config.seed_accepting);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn postgres_requires_database_url() {
        let config = parse(&[]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDatabaseUrl)
        ));

        let config = parse(&[("store_backend", "memory")]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        let config = parse(&[
            ("store_backend", "memory"),
            ("allow_origins", "http://a.test, http://b.test,,"),
            ("seed_api_keys", "one,two"),
        ])
        .unwrap();

        assert_eq!(
            config.allowed_origins(),
            ["http://a.test", "http://b.test"]
        );
        assert_eq!(config.seed_api_keys(), ["one", "two"]);
    }

    #[test]
    fn key_offset_is_validated() {
        let config = parse(&[
            ("store_backend", "memory"),
            ("key_utc_offset_minutes", "480"),
        ])
        .unwrap();
        assert_eq!(config.key_offset().unwrap().local_minus_utc(), 8 * 3600);

        let config = parse(&[
            ("store_backend", "memory"),
            ("key_utc_offset_minutes", "5000"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }
}
