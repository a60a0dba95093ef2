//! Distribution of quality labels in the reference dataset

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::dataset::ReferenceDataset;

/// Number of reference rows with a given quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityCount {
    pub quality: i64,
    pub count: u64,
}

/// Counts per distinct label, ascending by label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QualityHistogram {
    entries: Vec<QualityCount>,
}

impl QualityHistogram {
    pub fn compute(dataset: &ReferenceDataset) -> Self {
        Self::from_labels(dataset.qualities())
    }

    pub fn from_labels<I: IntoIterator<Item = i64>>(labels: I) -> Self {
        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for label in labels {
            *counts.entry(label).or_default() += 1;
        }

        let entries = counts
            .into_iter()
            .map(|(quality, count)| QualityCount { quality, count })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[QualityCount] {
        &self.entries
    }

    /// Total number of labelled rows
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }
}
