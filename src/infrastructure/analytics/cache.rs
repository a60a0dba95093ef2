//! Single-flight memoization of analytics results

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::{
    CorrelationMatrix, DistributionSet, DomainError, FeatureImportance, QualityHistogram,
};
use crate::infrastructure::observability::record_analytics_computation;

/// Memoized analytics, one slot per result.
///
/// Construct one per engine with [`AnalyticsCache::new`]; it lives as long
/// as its owner. Concurrent first access to a slot runs the computation
/// once and every caller awaits that same run. The run belongs to the slot,
/// not to the caller that started it, so a cancelled request does not throw
/// the work away. A failed computation leaves the slot empty so the next
/// request tries again. [`AnalyticsCache::reset`] empties every slot and
/// needs exclusive access.
#[derive(Debug, Default)]
pub struct AnalyticsCache {
    pub(crate) importances: Slot<Vec<FeatureImportance>>,
    pub(crate) correlation: Slot<CorrelationMatrix>,
    pub(crate) distributions: Slot<DistributionSet>,
    pub(crate) quality: Slot<QualityHistogram>,
}

/// Shared cell that in-flight computations keep alive
pub(crate) type Slot<T> = Arc<OnceCell<Arc<T>>>;

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every memoized result. Computations still running finish into
    /// the detached slots.
    pub fn reset(&mut self) {
        self.importances = Slot::default();
        self.correlation = Slot::default();
        self.distributions = Slot::default();
        self.quality = Slot::default();
    }

    /// Number of populated slots
    pub fn populated(&self) -> usize {
        [
            self.importances.initialized(),
            self.correlation.initialized(),
            self.distributions.initialized(),
            self.quality.initialized(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Return the cached value or compute it on the blocking pool exactly once.
///
/// Initialization runs in its own task holding the slot, so dropping the
/// returned future only stops waiting.
pub(crate) async fn memoize<T, F>(
    slot: &Slot<T>,
    kind: &'static str,
    compute: F,
) -> Result<Arc<T>, DomainError>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
{
    if let Some(value) = slot.get() {
        return Ok(Arc::clone(value));
    }

    let slot = Arc::clone(slot);
    let task = tokio::spawn(async move {
        let value = slot
            .get_or_try_init(|| async move {
                let started = Instant::now();

                let value = tokio::task::spawn_blocking(compute).await.map_err(|e| {
                    DomainError::internal(format!("{} computation aborted: {}", kind, e))
                })??;

                let elapsed = started.elapsed();
                record_analytics_computation(kind, elapsed);
                info!(kind, duration_ms = elapsed.as_millis() as u64, "Analytics computed");

                Ok::<_, DomainError>(Arc::new(value))
            })
            .await?;

        Ok::<_, DomainError>(Arc::clone(value))
    });

    task.await
        .map_err(|e| DomainError::internal(format!("{} computation aborted: {}", kind, e)))?
}
