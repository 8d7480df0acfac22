use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Path to the glossary JSON file
    #[serde(default = "default_glossary_path")]
    pub glossary_path: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Job engine config
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Notification config
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Google Gemini API
    #[default]
    Gemini,
    /// In-process mock, for dry runs and tests
    Mock,
}

impl TranslationProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Mock => "Mock",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::MissingField(format!("unknown provider type: {}", s))),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to the GEMINI_API_KEY environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Cells per translation batch
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Retry count for rate-limited requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            chunk_size: default_chunk_size(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("GEMINI_API_KEY").unwrap_or_default()
    }
}

/// Job engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobsConfig {
    /// Directory where submitted documents are staged
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Directory where finished artifacts are written
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Maximum number of jobs processed in parallel
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// How long terminal job records are kept before eviction (in seconds)
    #[serde(default = "default_record_retention_secs")]
    pub record_retention_secs: u64,

    /// How often the eviction sweep runs (in seconds)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            download_dir: default_download_dir(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            record_retention_secs: default_record_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Notification configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Sendmail-compatible command the composed message is piped to
    #[serde(default = "default_notify_command")]
    pub command: String,

    /// Sender address placed in the From header
    #[serde(default = "default_notify_from")]
    pub from: String,

    /// Delivery timeout in milliseconds
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            command: default_notify_command(),
            from: default_notify_from(),
            timeout_ms: default_notify_timeout_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "vi".to_string()
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_glossary_path() -> String {
    "glossary.json".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_chunk_size() -> usize {
    150 // cells per batch
}

fn default_retry_count() -> u32 {
    3 // Default to 3 attempts
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_download_dir() -> String {
    "downloads".to_string()
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_record_retention_secs() -> u64 {
    3600 // 1 hour
}

fn default_sweep_interval_secs() -> u64 {
    300 // 5 minutes
}

fn default_notify_command() -> String {
    "sendmail".to_string()
}

fn default_notify_from() -> String {
    "transheet@localhost".to_string()
}

fn default_notify_timeout_ms() -> u64 {
    30000
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validate the configuration for consistency and required values
    ///
    /// Runs before any job is accepted; a failure here stops the process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.glossary_path.trim().is_empty() {
            return Err(ConfigError::MissingField("glossary_path".to_string()));
        }

        if self.translation.chunk_size == 0 {
            return Err(ConfigError::MissingField("translation.chunk_size".to_string()));
        }

        if self.jobs.max_concurrent_jobs == 0 {
            return Err(ConfigError::MissingField("jobs.max_concurrent_jobs".to_string()));
        }

        // The mock provider needs no credentials or endpoint
        if self.translation.provider == TranslationProvider::Gemini {
            if self.translation.get_api_key().is_empty() {
                return Err(ConfigError::MissingApiKey(
                    self.translation.provider.display_name().to_string(),
                ));
            }
            url::Url::parse(&self.translation.endpoint)
                .map_err(|_| ConfigError::InvalidEndpoint(self.translation.endpoint.clone()))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            glossary_path: default_glossary_path(),
            translation: TranslationConfig::default(),
            jobs: JobsConfig::default(),
            notify: NotifyConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
