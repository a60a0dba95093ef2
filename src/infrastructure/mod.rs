//! Infrastructure layer - Loading, scoring pipelines and observability

pub mod analytics;
pub mod batch;
pub mod dataset;
pub mod logging;
pub mod model;
pub mod observability;
pub mod services;
pub mod tabular;
