use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration validation failures, naming field and value.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("storage root cannot be empty")]
    EmptyStorageRoot,

    #[error("invalid llm max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("invalid llm timeout_s: {0}. Must be positive")]
    InvalidLlmTimeout(u64),

    #[error("invalid enrichment total_deadline_s: {0}. Must be positive")]
    InvalidEnrichmentDeadline(u64),

    #[error("invalid cache_capacity: {0}. Must be at least 1")]
    InvalidCacheCapacity(usize),

    #[error("invalid max_csv_rows: {0}. Must be at least 1")]
    InvalidMaxCsvRows(usize),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.vidstrat/config.yaml` (project config)
    /// 3. `.vidstrat/local.yaml` (local overrides, optional)
    /// 4. Environment variables (`VIDSTRAT_*` prefix, `__` section split)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vidstrat/config.yaml"))
            .merge(Yaml::file(".vidstrat/local.yaml"))
            .merge(Env::prefixed("VIDSTRAT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorageRoot);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.llm.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.llm.max_attempts));
        }
        if config.llm.timeout_s == 0 {
            return Err(ConfigError::InvalidLlmTimeout(config.llm.timeout_s));
        }
        if config.enrichment.total_deadline_s == 0 {
            return Err(ConfigError::InvalidEnrichmentDeadline(
                config.enrichment.total_deadline_s,
            ));
        }
        if config.enrichment.cache_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(
                config.enrichment.cache_capacity,
            ));
        }
        if config.limits.max_csv_rows == 0 {
            return Err(ConfigError::InvalidMaxCsvRows(config.limits.max_csv_rows));
        }

        Ok(())
    }
}
