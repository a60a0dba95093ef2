//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::QualityService;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QualityService>,
}

impl AppState {
    pub fn new(service: Arc<QualityService>) -> Self {
        Self { service }
    }
}
