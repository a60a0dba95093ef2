use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::statistics::{DEFAULT_HISTOGRAM_BINS, DEFAULT_KDE_POINTS};
use crate::domain::{DistributionPolicy, DomainError};
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Directory of static assets served at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// JSON model artifact
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Delimited reference dataset with a `quality` column
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_kde_points")]
    pub kde_points: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Largest accepted number of data rows
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("artifacts/model.json")
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/winequality-red.csv")
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

fn default_kde_points() -> usize {
    DEFAULT_KDE_POINTS
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_rows() -> usize {
    100_000
}

fn default_chunk_size() -> usize {
    256
}

fn default_max_concurrent_chunks() -> usize {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            static_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
            kde_points: default_kde_points(),
        }
    }
}

impl AnalyticsConfig {
    pub fn policy(&self) -> Result<DistributionPolicy, DomainError> {
        DistributionPolicy::new(self.histogram_bins, self.kde_points)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_rows: default_max_rows(),
            chunk_size: default_chunk_size(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.analytics.policy()?;

        if self.batch.chunk_size == 0 {
            return Err(DomainError::configuration("batch.chunk_size must be at least 1"));
        }
        if self.batch.max_concurrent_chunks == 0 {
            return Err(DomainError::configuration(
                "batch.max_concurrent_chunks must be at least 1",
            ));
        }
        if self.batch.max_rows == 0 {
            return Err(DomainError::configuration("batch.max_rows must be at least 1"));
        }
        if self.batch.max_upload_bytes == 0 {
            return Err(DomainError::configuration(
                "batch.max_upload_bytes must be at least 1",
            ));
        }
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            return Err(DomainError::configuration(format!(
                "metrics.path must start with '/', got '{}'",
                self.metrics.path
            )));
        }

        Ok(())
    }
}
