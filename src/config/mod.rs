//! Layered configuration: `config/default`, `config/local`, then `APP__` env vars

mod app_config;

pub use app_config::{
    AnalyticsConfig, AppConfig, BatchConfig, DatasetConfig, LogFormat, LoggingConfig,
    ModelConfig, ServerConfig,
};
