//! Pearson correlation across every pair of features

use serde::Serialize;

use super::descriptive::min_max;
use crate::domain::dataset::ReferenceDataset;
use crate::domain::feature::{Feature, FEATURE_COUNT};
use crate::domain::DomainError;

/// One cell of the correlation matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationNode {
    pub x: Feature,
    pub y: Feature,
    pub value: f64,
}

/// Symmetric feature-by-feature correlation matrix with a unit diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
}

impl CorrelationMatrix {
    /// Compute over pairwise-complete observations
    pub fn compute(dataset: &ReferenceDataset) -> Result<Self, DomainError> {
        for feature in Feature::ALL {
            let observed = dataset.observed(feature);

            if observed.len() < 2 {
                return Err(DomainError::degenerate_input(format!(
                    "Feature '{}' has fewer than two observations",
                    feature
                )));
            }

            let is_constant = matches!(min_max(&observed), Some((min, max)) if min == max);
            if is_constant {
                return Err(DomainError::degenerate_input(format!(
                    "Feature '{}' has zero variance",
                    feature
                )));
            }
        }

        let mut values = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];

        for (i, a) in Feature::ALL.into_iter().enumerate() {
            values[i][i] = 1.0;

            for (j, b) in Feature::ALL.into_iter().enumerate().skip(i + 1) {
                let r = pearson_pairwise(dataset.column(a), dataset.column(b))
                    .ok_or_else(|| {
                        DomainError::degenerate_input(format!(
                            "Correlation between '{}' and '{}' is undefined",
                            a, b
                        ))
                    })?;

                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self { values })
    }

    /// Correlation between two features
    pub fn get(&self, a: Feature, b: Feature) -> f64 {
        self.values[a.index()][b.index()]
    }

    /// Feature order of rows and columns
    pub fn features(&self) -> Vec<Feature> {
        Feature::ALL.to_vec()
    }

    /// Every (x, y) cell, row-major in schema order
    pub fn nodes(&self) -> Vec<CorrelationNode> {
        Feature::ALL
            .into_iter()
            .flat_map(|x| {
                Feature::ALL.into_iter().map(move |y| CorrelationNode {
                    x,
                    y,
                    value: self.get(x, y),
                })
            })
            .collect()
    }
}

/// Pearson r over rows where both values are present.
///
/// `None` when fewer than two complete pairs exist or either side is
/// constant over those pairs.
pub fn pearson_pairwise(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    // Checked on raw values, not on the rounded sums of squares
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|(x, _)| *x == x0) || pairs.iter().all(|(_, y)| *y == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}
