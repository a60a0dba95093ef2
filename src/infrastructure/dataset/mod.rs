//! Loads the reference dataset from a delimited file

use std::path::Path;

use tracing::{info, warn};

use crate::domain::feature::normalize_name;
use crate::domain::{DomainError, Feature, ReferenceDataset, ReferenceRow, FEATURE_COUNT};
use crate::infrastructure::tabular::{open_reader, read_headers};

const QUALITY_COLUMN: &str = "quality";

/// Parse a reference dataset.
///
/// Blank or unparseable cells become missing observations; a quality that
/// is not a whole number leaves the row out of the quality histogram only.
pub fn parse_reference_dataset(data: &[u8]) -> Result<ReferenceDataset, DomainError> {
    let mut reader = open_reader(data);
    let headers = read_headers(&mut reader)?;

    let mut positions: [Option<usize>; FEATURE_COUNT] = [None; FEATURE_COUNT];
    let mut quality_position = None;

    for (position, header) in headers.iter().enumerate() {
        if let Some(feature) = Feature::resolve(header) {
            positions[feature.index()].get_or_insert(position);
        } else if normalize_name(header) == QUALITY_COLUMN {
            quality_position.get_or_insert(position);
        }
    }

    let mut missing: Vec<&str> = Feature::ALL
        .into_iter()
        .filter(|f| positions[f.index()].is_none())
        .map(Feature::name)
        .collect();
    if quality_position.is_none() {
        missing.push(QUALITY_COLUMN);
    }

    if !missing.is_empty() {
        return Err(DomainError::schema(format!(
            "Reference dataset is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row = index, error = %e, "Skipping unreadable reference row");
                skipped += 1;
                continue;
            }
        };

        let cell = |position: Option<usize>| -> Option<f64> {
            position
                .and_then(|p| record.get(p))
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let mut row = ReferenceRow::default();
        for (slot, position) in row.features.iter_mut().zip(positions) {
            *slot = cell(position);
        }
        row.quality = cell(quality_position)
            .filter(|q| q.fract() == 0.0)
            .map(|q| q as i64);

        rows.push(row);
    }

    let dataset = ReferenceDataset::from_rows(rows)?;
    info!(rows = dataset.len(), skipped, "Reference dataset parsed");

    Ok(dataset)
}

/// Read and parse the reference dataset file
pub fn load_reference_dataset(path: impl AsRef<Path>) -> Result<ReferenceDataset, DomainError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        DomainError::configuration(format!(
            "Failed to read reference dataset '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_reference_dataset(&data)
}
