use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for vidstrat.
///
/// This is a closed record: every recognized option appears here, with
/// defaults matching the documented limits. Loading merges file and
/// environment sources (see `infrastructure::config::ConfigLoader`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Root directory for persisted strategies.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// LLM endpoint configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Best-effort enrichment provider configuration.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Tabular input limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Playground server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".vidstrat")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            llm: LlmConfig::default(),
            enrichment: EnrichmentConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Directory the strategy store writes into:
    /// `<storage_root>/strategies/`.
    pub fn strategies_dir(&self) -> PathBuf {
        self.storage_root.join("strategies")
    }
}

/// Text-generation endpoint settings.
///
/// An empty endpoint or api key forces the generation step straight to
/// fallback without any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    /// Per-attempt wall clock in seconds.
    #[serde(default = "default_llm_timeout_s")]
    pub timeout_s: u64,

    /// Maximum attempts (initial call included).
    #[serde(default = "default_llm_max_attempts")]
    pub max_attempts: u32,
}

const fn default_llm_timeout_s() -> u64 {
    60
}

const fn default_llm_max_attempts() -> u32 {
    3
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_s: default_llm_timeout_s(),
            max_attempts: default_llm_max_attempts(),
        }
    }
}

impl LlmConfig {
    /// Whether enough is configured to attempt a network call at all.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Autocomplete/trends fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnrichmentConfig {
    /// Combined wall-clock deadline for all provider calls, in seconds.
    #[serde(default = "default_enrichment_deadline_s")]
    pub total_deadline_s: u64,

    /// How many top terms to enrich.
    #[serde(default = "default_enrichment_terms")]
    pub top_terms: usize,

    /// Memoization TTL in seconds.
    #[serde(default = "default_cache_ttl_s")]
    pub cache_ttl_s: u64,

    /// Memoization capacity (entries).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

const fn default_enrichment_deadline_s() -> u64 {
    8
}

const fn default_enrichment_terms() -> usize {
    10
}

const fn default_cache_ttl_s() -> u64 {
    300
}

const fn default_cache_capacity() -> usize {
    1000
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            total_deadline_s: default_enrichment_deadline_s(),
            top_terms: default_enrichment_terms(),
            cache_ttl_s: default_cache_ttl_s(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Size caps for untrusted tabular input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsConfig {
    #[serde(default = "default_max_csv_bytes")]
    pub max_csv_bytes: u64,

    #[serde(default = "default_max_csv_rows")]
    pub max_csv_rows: usize,

    #[serde(default = "default_max_cell_chars")]
    pub max_cell_chars: usize,
}

const fn default_max_csv_bytes() -> u64 {
    52_428_800
}

const fn default_max_csv_rows() -> usize {
    100_000
}

const fn default_max_cell_chars() -> usize {
    10_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_csv_bytes: default_max_csv_bytes(),
            max_csv_rows: default_max_csv_rows(),
            max_cell_chars: default_max_cell_chars(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; stdout-only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Playground server configuration. The server only ever binds loopback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

const fn default_server_port() -> u16 {
    7878
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_csv_bytes, 52_428_800);
        assert_eq!(config.limits.max_csv_rows, 100_000);
        assert_eq!(config.limits.max_cell_chars, 10_000);
        assert_eq!(config.llm.timeout_s, 60);
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.enrichment.total_deadline_s, 8);
        assert_eq!(config.enrichment.cache_ttl_s, 300);
        assert_eq!(config.enrichment.cache_capacity, 1000);
    }

    #[test]
    fn llm_unconfigured_without_key() {
        let mut llm = LlmConfig {
            endpoint: "http://localhost:9000/v1/generate".to_string(),
            ..Default::default()
        };
        assert!(!llm.is_configured());
        llm.api_key = "secret".to_string();
        assert!(llm.is_configured());
    }
}
