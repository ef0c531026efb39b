use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{Config, StreamSource};

/// Project config file read when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/orders.yaml";

/// Prefix for structured environment overrides, e.g. `ORDERS_DATABASE__URL`.
pub const ENV_PREFIX: &str = "ORDERS_";

/// Deployment variables understood for compatibility, and the key each sets.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("DB_CONN_STR", "database.url"),
    ("KAFKA_BROKERS", "stream.brokers"),
    ("HTTP_SERVER_ADDR", "http.bind"),
];

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Database URL cannot be empty")]
    EmptyDatabaseUrl,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Stream topic cannot be empty")]
    EmptyTopic,

    #[error("Stream consumer group cannot be empty")]
    EmptyGroupId,

    #[error("At least one broker address is required for the kafka source")]
    NoBrokers,

    #[error("Invalid HTTP bind address: {0}")]
    InvalidBindAddress(String),
}

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub brokers: Option<String>,
    pub bind: Option<String>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML file (`path`, or `config/orders.yaml` when present)
    /// 3. Legacy deployment variables (`DB_CONN_STR`, `KAFKA_BROKERS`, `HTTP_SERVER_ADDR`)
    /// 4. Environment variables (`ORDERS_*` prefix, `__` separates nesting)
    /// 5. Command-line overrides
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
        let mut config: Config = Self::figment(path)?
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::apply_overrides(&mut config, overrides);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Build the merged figment without extracting it.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_PATH),
        };

        Ok(Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.database_url {
            config.database.url.clone_from(url);
        }
        if let Some(brokers) = &overrides.brokers {
            config.stream.brokers.clone_from(brokers);
        }
        if let Some(bind) = &overrides.bind {
            config.http.bind.clone_from(bind);
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        if config.stream.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }

        if config.stream.group_id.trim().is_empty() {
            return Err(ConfigError::EmptyGroupId);
        }

        if config.stream.source == StreamSource::Kafka && config.stream.broker_list().is_empty() {
            return Err(ConfigError::NoBrokers);
        }

        if config.http.socket_addr().is_err() {
            return Err(ConfigError::InvalidBindAddress(config.http.bind.clone()));
        }

        let level = config.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

fn legacy_env() -> Env {
    Env::raw()
        .only(&LEGACY_ENV.map(|(var, _)| var))
        .map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                .map_or_else(|| key.into(), |(_, path)| (*path).into())
        })
}
