//! Infrastructure services

mod quality_service;

pub use quality_service::{Engine, QualityService, ServiceState};
