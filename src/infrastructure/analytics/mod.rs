//! Dataset analytics and importance ranking, memoized per engine

mod cache;

use std::sync::Arc;

pub use cache::AnalyticsCache;
use cache::memoize;

use crate::domain::statistics::compute_distributions;
use crate::domain::{
    CorrelationMatrix, DistributionPolicy, DistributionSet, DomainError, FeatureImportance,
    ImportanceRanker, QualityHistogram, Recommendation, RecommendationAdvisor, ReferenceDataset,
};

/// Read-only analytics over the reference dataset and the loaded model
#[derive(Debug)]
pub struct AnalyticsService {
    dataset: Arc<ReferenceDataset>,
    ranker: ImportanceRanker,
    policy: DistributionPolicy,
    cache: AnalyticsCache,
}

impl AnalyticsService {
    pub fn new(
        dataset: Arc<ReferenceDataset>,
        ranker: ImportanceRanker,
        policy: DistributionPolicy,
        cache: AnalyticsCache,
    ) -> Self {
        Self {
            dataset,
            ranker,
            policy,
            cache,
        }
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn cache(&self) -> &AnalyticsCache {
        &self.cache
    }

    /// Teardown hook for tests and reloads
    pub fn reset_cache(&mut self) {
        self.cache.reset();
    }

    pub async fn importances(&self) -> Result<Arc<Vec<FeatureImportance>>, DomainError> {
        let ranker = self.ranker.clone();
        memoize(&self.cache.importances, "importance", move || ranker.rank()).await
    }

    /// Derived from the memoized ranking; cheap enough not to cache
    pub async fn recommendation(&self) -> Result<Recommendation, DomainError> {
        let ranking = self.importances().await?;
        RecommendationAdvisor::advise(&ranking)
    }

    pub async fn correlation(&self) -> Result<Arc<CorrelationMatrix>, DomainError> {
        let dataset = Arc::clone(&self.dataset);
        memoize(&self.cache.correlation, "correlation", move || {
            CorrelationMatrix::compute(&dataset)
        })
        .await
    }

    pub async fn distributions(&self) -> Result<Arc<DistributionSet>, DomainError> {
        let dataset = Arc::clone(&self.dataset);
        let policy = self.policy;
        memoize(&self.cache.distributions, "distribution", move || {
            compute_distributions(&dataset, policy)
        })
        .await
    }

    pub async fn quality_histogram(&self) -> Result<Arc<QualityHistogram>, DomainError> {
        let dataset = Arc::clone(&self.dataset);
        memoize(&self.cache.quality, "quality", move || {
            Ok(QualityHistogram::compute(&dataset))
        })
        .await
    }
}
