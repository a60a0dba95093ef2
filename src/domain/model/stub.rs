//! Deterministic stand-in for a trained model

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::regressor::{ModelError, ModelInput, QualityModel};
use crate::domain::feature::{Feature, FEATURE_COUNT};

/// Affine scorer with call counters and an optional importance delay
#[derive(Debug, Default)]
pub struct StubModel {
    importance_calls: AtomicUsize,
    predict_many_calls: AtomicUsize,
    importance_delay: Option<Duration>,
    without_importances: bool,
}

impl StubModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside `feature_importances` to widen race windows
    pub fn with_importance_delay(mut self, delay: Duration) -> Self {
        self.importance_delay = Some(delay);
        self
    }

    /// Behave like a model that cannot report importances
    pub fn without_importances(mut self) -> Self {
        self.without_importances = true;
        self
    }

    pub fn importance_calls(&self) -> usize {
        self.importance_calls.load(Ordering::SeqCst)
    }

    pub fn predict_many_calls(&self) -> usize {
        self.predict_many_calls.load(Ordering::SeqCst)
    }

    fn score(input: &ModelInput) -> f64 {
        5.0 + 0.3 * (input[Feature::Alcohol.index()] - 10.0)
            - (input[Feature::VolatileAcidity.index()] - 0.5)
    }
}

impl QualityModel for StubModel {
    fn describe(&self) -> String {
        "stub".to_string()
    }

    fn predict_one(&self, input: &ModelInput) -> Result<f64, ModelError> {
        Ok(Self::score(input))
    }

    fn predict_many(&self, inputs: &[ModelInput]) -> Result<Vec<f64>, ModelError> {
        self.predict_many_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(Self::score).collect())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.importance_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.importance_delay {
            std::thread::sleep(delay);
        }

        if self.without_importances {
            return None;
        }

        let mut importances = vec![1.0; FEATURE_COUNT];
        importances[Feature::Alcohol.index()] = 8.0;
        importances[Feature::VolatileAcidity.index()] = 4.0;
        importances[Feature::Sulphates.index()] = 3.0;
        Some(importances)
    }
}
