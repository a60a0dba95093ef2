//! Reference dataset used for all dataset-level statistics

use crate::domain::feature::{Feature, FEATURE_COUNT};
use crate::domain::DomainError;

/// One historical sample; any measurement may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceRow {
    pub features: [Option<f64>; FEATURE_COUNT],
    pub quality: Option<i64>,
}

impl ReferenceRow {
    /// A fully observed row
    pub fn complete(features: [f64; FEATURE_COUNT], quality: i64) -> Self {
        Self {
            features: features.map(Some),
            quality: Some(quality),
        }
    }
}

/// Immutable column-oriented sample set
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    columns: Vec<Vec<Option<f64>>>,
    quality: Vec<Option<i64>>,
}

impl ReferenceDataset {
    /// Build from rows, failing on an empty set
    pub fn from_rows<I>(rows: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = ReferenceRow>,
    {
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); FEATURE_COUNT];
        let mut quality = Vec::new();

        for row in rows {
            for (column, value) in columns.iter_mut().zip(row.features) {
                column.push(value.filter(|v| v.is_finite()));
            }
            quality.push(row.quality);
        }

        if quality.is_empty() {
            return Err(DomainError::no_data("Reference dataset contains no rows"));
        }

        Ok(Self { columns, quality })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.quality.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quality.is_empty()
    }

    /// Raw column including missing observations
    pub fn column(&self, feature: Feature) -> &[Option<f64>] {
        &self.columns[feature.index()]
    }

    /// Non-missing observations of a feature, in row order
    pub fn observed(&self, feature: Feature) -> Vec<f64> {
        self.column(feature).iter().flatten().copied().collect()
    }

    /// Quality labels of rows that carry one
    pub fn qualities(&self) -> impl Iterator<Item = i64> + '_ {
        self.quality.iter().flatten().copied()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_dataset;
    use super::*;

    #[test]
    fn test_empty_dataset_is_no_data() {
        let err = ReferenceDataset::from_rows(Vec::new()).unwrap_err();
        assert!(matches!(err, DomainError::NoData { .. }));
    }

    #[test]
    fn test_observed_skips_missing() {
        let mut partial = ReferenceRow::complete([1.0; FEATURE_COUNT], 6);
        partial.features[Feature::Density.index()] = None;
        partial.quality = None;

        let dataset = ReferenceDataset::from_rows(vec![
            ReferenceRow::complete([2.0; FEATURE_COUNT], 5),
            partial,
        ])
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.observed(Feature::Density), vec![2.0]);
        assert_eq!(dataset.observed(Feature::Alcohol), vec![2.0, 1.0]);
        assert_eq!(dataset.qualities().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_fixture_shape() {
        let dataset = sample_dataset();
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.column(Feature::Ph).len(), 10);
    }
}
