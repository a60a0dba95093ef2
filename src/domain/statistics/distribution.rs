//! Per-feature histogram and Gaussian kernel density curve

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;

use super::descriptive::{interquartile_range, min_max, std_dev};
use crate::domain::dataset::ReferenceDataset;
use crate::domain::feature::Feature;
use crate::domain::DomainError;

/// Smallest histogram resolution accepted
pub const MIN_HISTOGRAM_BINS: usize = 10;
/// Default histogram resolution
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
/// Default number of density samples
pub const DEFAULT_KDE_POINTS: usize = 100;

/// Resolution of histogram and density curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionPolicy {
    histogram_bins: usize,
    kde_points: usize,
}

impl DistributionPolicy {
    pub fn new(histogram_bins: usize, kde_points: usize) -> Result<Self, DomainError> {
        if histogram_bins < MIN_HISTOGRAM_BINS {
            return Err(DomainError::configuration(format!(
                "histogram_bins must be at least {}, got {}",
                MIN_HISTOGRAM_BINS, histogram_bins
            )));
        }

        if kde_points < 2 {
            return Err(DomainError::configuration(format!(
                "kde_points must be at least 2, got {}",
                kde_points
            )));
        }

        Ok(Self {
            histogram_bins,
            kde_points,
        })
    }

    pub fn histogram_bins(&self) -> usize {
        self.histogram_bins
    }

    pub fn kde_points(&self) -> usize {
        self.kde_points
    }
}

impl Default for DistributionPolicy {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            kde_points: DEFAULT_KDE_POINTS,
        }
    }
}

/// Histogram and density curve of one feature.
///
/// `bins` holds `counts.len() + 1` edges. `kde_y` spans the same range as
/// the edges; consumers align it to the bars by relative position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionProfile {
    pub bins: Vec<f64>,
    pub counts: Vec<u64>,
    pub kde_y: Vec<f64>,
}

impl DistributionProfile {
    /// Profile the observed values of one feature
    pub fn compute(
        feature: Feature,
        values: &[f64],
        policy: DistributionPolicy,
    ) -> Result<Self, DomainError> {
        let (min, max) = min_max(values).ok_or_else(|| {
            DomainError::degenerate_input(format!("Feature '{}' has no observations", feature))
        })?;

        if min == max {
            return Err(DomainError::degenerate_input(format!(
                "Feature '{}' has a single distinct value",
                feature
            )));
        }

        let (bins, counts) = equal_width_histogram(values, min, max, policy.histogram_bins);
        let bandwidth = silverman_bandwidth(values).ok_or_else(|| {
            DomainError::degenerate_input(format!(
                "Feature '{}' has no spread for density estimation",
                feature
            ))
        })?;
        let kde_y = gaussian_kde(values, bandwidth, min, max, policy.kde_points);

        Ok(Self { bins, counts, kde_y })
    }
}

/// Profiles for every feature, keyed in schema order
pub type DistributionSet = BTreeMap<Feature, DistributionProfile>;

/// Profile every feature of the dataset
pub fn compute_distributions(
    dataset: &ReferenceDataset,
    policy: DistributionPolicy,
) -> Result<DistributionSet, DomainError> {
    Feature::ALL
        .into_iter()
        .map(|feature| {
            let profile = DistributionProfile::compute(feature, &dataset.observed(feature), policy)?;
            Ok((feature, profile))
        })
        .collect()
}

/// Equal-width bins over [min, max]; the last bin is closed on the right
pub fn equal_width_histogram(
    values: &[f64],
    min: f64,
    max: f64,
    bins: usize,
) -> (Vec<f64>, Vec<u64>) {
    let width = (max - min) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|k| min + width * k as f64).collect();
    edges[bins] = max;

    let mut counts = vec![0u64; bins];
    for &value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    (edges, counts)
}

/// Silverman's rule of thumb: `0.9 * min(sd, IQR / 1.34) * n^(-1/5)`.
///
/// Falls back to `sd` when the IQR is zero; `None` when `sd` is zero.
pub fn silverman_bandwidth(values: &[f64]) -> Option<f64> {
    let sd = std_dev(values);
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let iqr = interquartile_range(&sorted).unwrap_or(0.0);
    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };

    Some(0.9 * spread * (values.len() as f64).powf(-0.2))
}

/// Gaussian KDE evaluated at `points` evenly spaced positions over [min, max]
pub fn gaussian_kde(values: &[f64], bandwidth: f64, min: f64, max: f64, points: usize) -> Vec<f64> {
    let step = (max - min) / (points - 1) as f64;
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());

    (0..points)
        .map(|j| {
            let x = min + step * j as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            sum * norm
        })
        .collect()
}
