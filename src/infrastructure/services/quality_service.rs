//! Service facade: owns the loaded engine and its lifecycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, BatchConfig};
use crate::domain::{
    BatchRow, CorrelationMatrix, DistributionPolicy, DistributionSet, DomainError,
    FeatureImportance, FeatureVector, ImportanceRanker, PredictionResult, QualityHistogram,
    QualityModel, Recommendation, ReferenceDataset, Scorer,
};
use crate::infrastructure::analytics::{AnalyticsCache, AnalyticsService};
use crate::infrastructure::batch::BatchIngestor;
use crate::infrastructure::dataset::load_reference_dataset;
use crate::infrastructure::model::load_model;
use crate::infrastructure::observability::{record_prediction, PredictionMode};

/// Lifecycle of the facade. There is no way back without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Uninitialized,
    Ready,
    Serving,
}

/// Everything needed to answer requests, loaded once at startup
#[derive(Debug)]
pub struct Engine {
    scorer: Arc<Scorer>,
    analytics: AnalyticsService,
    ingestor: BatchIngestor,
    loaded_at: DateTime<Utc>,
}

impl Engine {
    pub fn new(
        model: Arc<dyn QualityModel>,
        dataset: ReferenceDataset,
        policy: DistributionPolicy,
        batch: BatchConfig,
    ) -> Self {
        let scorer = Arc::new(Scorer::new(Arc::clone(&model)));

        Self {
            analytics: AnalyticsService::new(
                Arc::new(dataset),
                ImportanceRanker::new(model),
                policy,
                AnalyticsCache::new(),
            ),
            ingestor: BatchIngestor::new(Arc::clone(&scorer), batch),
            scorer,
            loaded_at: Utc::now(),
        }
    }

    /// Load the model artifact and reference dataset named in the config
    pub fn load(config: &AppConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let model = load_model(&config.model.path)?;
        let dataset = load_reference_dataset(&config.dataset.path)?;

        Ok(Self::new(
            model,
            dataset,
            config.analytics.policy()?,
            config.batch.clone(),
        ))
    }

    pub fn scorer(&self) -> &Arc<Scorer> {
        &self.scorer
    }

    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }

    pub fn ingestor(&self) -> &BatchIngestor {
        &self.ingestor
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Entry point for every domain request.
///
/// Until an engine is installed every request fails with `NotReady`.
#[derive(Debug, Default)]
pub struct QualityService {
    engine: OnceLock<Arc<Engine>>,
    serving: AtomicBool,
}

impl QualityService {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn ready(engine: Engine) -> Self {
        let service = Self::default();
        let _ = service.engine.set(Arc::new(engine));
        service
    }

    /// Install the engine. Only the first call takes effect.
    pub fn initialize(&self, engine: Engine) -> Result<(), DomainError> {
        self.engine
            .set(Arc::new(engine))
            .map_err(|_| DomainError::configuration("Engine is already initialized"))?;

        info!("Quality service ready");
        Ok(())
    }

    pub fn state(&self) -> ServiceState {
        match self.engine.get() {
            None => ServiceState::Uninitialized,
            Some(_) if self.serving.load(Ordering::Acquire) => ServiceState::Serving,
            Some(_) => ServiceState::Ready,
        }
    }

    /// The loaded engine without counting as a served request
    pub fn loaded(&self) -> Option<Arc<Engine>> {
        self.engine.get().cloned()
    }

    /// The loaded engine; marks the service as serving
    pub fn engine(&self) -> Result<Arc<Engine>, DomainError> {
        let engine = self.engine.get().ok_or_else(|| {
            DomainError::not_ready("Model and reference dataset are not loaded")
        })?;

        if !self.serving.swap(true, Ordering::AcqRel) {
            info!("Quality service handling its first request");
        }

        Ok(Arc::clone(engine))
    }

    pub async fn feature_importances(&self) -> Result<Arc<Vec<FeatureImportance>>, DomainError> {
        self.engine()?.analytics().importances().await
    }

    pub async fn recommendation(&self) -> Result<Recommendation, DomainError> {
        self.engine()?.analytics().recommendation().await
    }

    pub async fn correlation(&self) -> Result<Arc<CorrelationMatrix>, DomainError> {
        self.engine()?.analytics().correlation().await
    }

    pub async fn distributions(&self) -> Result<Arc<DistributionSet>, DomainError> {
        self.engine()?.analytics().distributions().await
    }

    pub async fn quality_distribution(&self) -> Result<Arc<QualityHistogram>, DomainError> {
        self.engine()?.analytics().quality_histogram().await
    }

    /// Score one vector, optionally echoing the validated features back
    pub async fn predict(
        &self,
        vector: FeatureVector,
        echo: bool,
    ) -> Result<PredictionResult, DomainError> {
        let scorer = Arc::clone(self.engine()?.scorer());
        let started = Instant::now();

        let outcome = tokio::task::spawn_blocking(move || scorer.predict_one(&vector))
            .await
            .map_err(|e| DomainError::internal(format!("Prediction task aborted: {}", e)))?;

        let failed = usize::from(outcome.is_err());
        record_prediction(PredictionMode::Single, 1, failed, started.elapsed());

        let quality = outcome?;
        let result = PredictionResult::new(quality);

        Ok(if echo { result.with_features(vector) } else { result })
    }

    /// Score an uploaded table
    pub async fn predict_batch(&self, data: Bytes) -> Result<Vec<BatchRow>, DomainError> {
        let engine = self.engine()?;
        let started = Instant::now();

        let rows = engine.ingestor().ingest(data).await.inspect_err(|e| {
            warn!(error = %e, "Batch rejected");
        })?;

        let failed = rows.iter().filter(|row| row.is_failed()).count();
        record_prediction(PredictionMode::Batch, rows.len(), failed, started.elapsed());

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::fixtures::sample_dataset;
    use crate::domain::feature::fixtures::reference_vector;
    use crate::domain::model::StubModel;
    use crate::domain::Feature;

    fn engine() -> Engine {
        Engine::new(
            Arc::new(StubModel::new()),
            sample_dataset(),
            DistributionPolicy::default(),
            BatchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_uninitialized_rejects_requests() {
        let service = QualityService::uninitialized();

        assert_eq!(service.state(), ServiceState::Uninitialized);
        let err = service.predict(reference_vector(), false).await.unwrap_err();
        assert!(matches!(err, DomainError::NotReady { .. }));
        assert!(service.correlation().await.is_err());
        assert_eq!(service.state(), ServiceState::Uninitialized);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let service = QualityService::uninitialized();
        service.initialize(engine()).unwrap();
        assert_eq!(service.state(), ServiceState::Ready);

        service.quality_distribution().await.unwrap();
        assert_eq!(service.state(), ServiceState::Serving);

        assert!(service.initialize(engine()).is_err());
        assert_eq!(service.state(), ServiceState::Serving);
    }

    #[tokio::test]
    async fn test_predict_with_echo() {
        let service = QualityService::ready(engine());

        let result = service.predict(reference_vector(), true).await.unwrap();
        assert!((result.quality - 4.62).abs() < 1e-9);
        assert_eq!(result.features, Some(reference_vector()));

        let result = service.predict(reference_vector(), false).await.unwrap();
        assert!(result.features.is_none());
    }

    #[tokio::test]
    async fn test_analytics_before_any_prediction() {
        let service = QualityService::ready(engine());

        let correlation = service.correlation().await.unwrap();
        assert_eq!(correlation.nodes().len(), 121);
        for feature in Feature::ALL {
            assert!((correlation.get(feature, feature) - 1.0).abs() < 1e-9);
        }

        let recommendation = service.recommendation().await.unwrap();
        assert_eq!(recommendation.primary_driver, Feature::Alcohol);
    }

    #[tokio::test]
    async fn test_predict_batch() {
        let service = QualityService::ready(engine());
        let data = Bytes::from(
            "fixed acidity,volatile acidity,citric acid,residual sugar,chlorides,\
free sulfur dioxide,total sulfur dioxide,density,pH,sulphates,alcohol\n\
7.4,0.7,0,1.9,0.076,11,34,0.9978,3.51,0.56,9.4\n",
        );

        let rows = service.predict_batch(data).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].predicted_quality().unwrap() - 4.62).abs() < 1e-9);
    }
}
