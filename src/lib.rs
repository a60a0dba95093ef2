//! Wine Quality Engine
//!
//! Serves a trained wine quality regressor and analytics over a reference
//! dataset of red wine chemistry:
//! - Single and batch quality predictions
//! - Feature importance ranking and a derived recommendation
//! - Correlation, per-feature distributions and quality counts

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
