//! Dataset-level statistics: correlation, distributions and quality counts

mod correlation;
pub mod descriptive;
mod distribution;
mod quality;

pub use correlation::{pearson_pairwise, CorrelationMatrix, CorrelationNode};
pub use distribution::{
    compute_distributions, equal_width_histogram, gaussian_kde, silverman_bandwidth,
    DistributionPolicy, DistributionProfile, DistributionSet, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_KDE_POINTS, MIN_HISTOGRAM_BINS,
};
pub use quality::{QualityCount, QualityHistogram};
