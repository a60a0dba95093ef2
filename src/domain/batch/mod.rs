//! Batch rows: header mapping, per-row validation and chunk scoring

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::feature::{parse_cell, Feature, FeatureVector, FeatureVectorBuilder, FEATURE_COUNT};
use crate::domain::model::Scorer;
use crate::domain::DomainError;

/// Keys appended to every echoed row
const ROW_INDEX_KEY: &str = "row_index";
const PREDICTION_KEY: &str = "predicted_quality";
const ERROR_KEY: &str = "error";

/// Where each feature lives in an uploaded table
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    headers: Vec<String>,
    positions: [usize; FEATURE_COUNT],
}

impl ColumnMapping {
    /// Map header names onto features.
    ///
    /// Unrecognized columns are ignored; the first column resolving to a
    /// feature wins. Missing features fail the whole table.
    pub fn from_headers(headers: Vec<String>) -> Result<Self, DomainError> {
        let mut slots: [Option<usize>; FEATURE_COUNT] = [None; FEATURE_COUNT];

        for (position, header) in headers.iter().enumerate() {
            if let Some(feature) = Feature::resolve(header) {
                slots[feature.index()].get_or_insert(position);
            }
        }

        let missing: Vec<&str> = Feature::ALL
            .into_iter()
            .filter(|feature| slots[feature.index()].is_none())
            .map(Feature::name)
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::schema(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut positions = [0; FEATURE_COUNT];
        for (position, slot) in positions.iter_mut().zip(slots) {
            *position = slot.unwrap_or_default();
        }

        Ok(Self { headers, positions })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Column index of a feature
    pub fn position(&self, feature: Feature) -> usize {
        self.positions[feature.index()]
    }

    /// Validate and coerce one record
    pub fn vector(&self, cells: &[String]) -> Result<FeatureVector, DomainError> {
        if cells.len() != self.headers.len() {
            return Err(DomainError::schema(format!(
                "Row has {} cells, expected {}",
                cells.len(),
                self.headers.len()
            )));
        }

        let mut builder = FeatureVectorBuilder::new();
        for feature in Feature::ALL {
            builder.set(feature, parse_cell(feature, &cells[self.position(feature)])?)?;
        }

        builder.build()
    }

    /// The record as it was uploaded, numbers echoed as numbers
    pub fn echo(&self, cells: &[String]) -> Map<String, Value> {
        self.headers
            .iter()
            .zip(cells)
            .map(|(header, cell)| (header.clone(), echo_value(cell)))
            .collect()
    }
}

fn echo_value(cell: &str) -> Value {
    cell.trim()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

/// One record as read from the table; `cells` is an error if the record
/// itself could not be decoded
#[derive(Debug, Clone)]
pub struct RawRow {
    pub index: usize,
    pub cells: Result<Vec<String>, String>,
}

/// Prediction or failure reason for one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Predicted(f64),
    Failed(String),
}

/// One scored (or rejected) input row, tagged with its original position
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub row_index: usize,
    pub fields: Map<String, Value>,
    pub outcome: RowOutcome,
}

impl BatchRow {
    pub fn predicted_quality(&self) -> Option<f64> {
        match self.outcome {
            RowOutcome::Predicted(quality) => Some(quality),
            RowOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RowOutcome::Predicted(_) => None,
            RowOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }
}

impl Serialize for BatchRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        for (key, value) in &self.fields {
            if matches!(key.as_str(), ROW_INDEX_KEY | PREDICTION_KEY | ERROR_KEY) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }

        map.serialize_entry(ROW_INDEX_KEY, &self.row_index)?;
        map.serialize_entry(PREDICTION_KEY, &self.predicted_quality())?;

        if let Some(reason) = self.error() {
            map.serialize_entry(ERROR_KEY, reason)?;
        }

        map.end()
    }
}

/// Validate and score a chunk of rows, returning them in input order.
///
/// Valid rows are scored with one vectorized call. If that call fails the
/// chunk is rescored row by row so only the offending rows are flagged.
pub fn score_chunk(scorer: &Scorer, mapping: &ColumnMapping, rows: Vec<RawRow>) -> Vec<BatchRow> {
    let mut outcomes: Vec<Option<RowOutcome>> = vec![None; rows.len()];
    let mut slots = Vec::with_capacity(rows.len());
    let mut vectors = Vec::with_capacity(rows.len());

    for (slot, row) in rows.iter().enumerate() {
        let parsed = row
            .cells
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|cells| mapping.vector(cells).map_err(|e| e.reason().to_string()));

        match parsed {
            Ok(vector) => {
                slots.push(slot);
                vectors.push(vector);
            }
            Err(reason) => outcomes[slot] = Some(RowOutcome::Failed(reason)),
        }
    }

    match scorer.predict_many(&vectors) {
        Ok(scores) => {
            for (slot, score) in slots.iter().zip(scores) {
                outcomes[*slot] = Some(RowOutcome::Predicted(score));
            }
        }
        Err(err) => {
            debug!(error = %err, rows = vectors.len(), "Vectorized scoring failed, rescoring rows individually");

            for (slot, vector) in slots.iter().zip(&vectors) {
                outcomes[*slot] = Some(match scorer.predict_one(vector) {
                    Ok(score) => RowOutcome::Predicted(score),
                    Err(e) => RowOutcome::Failed(e.reason().to_string()),
                });
            }
        }
    }

    rows.into_iter()
        .zip(outcomes)
        .map(|(row, outcome)| BatchRow {
            row_index: row.index,
            fields: row
                .cells
                .as_deref()
                .map(|cells| mapping.echo(cells))
                .unwrap_or_default(),
            outcome: outcome.unwrap_or_else(|| RowOutcome::Failed("Row was not scored".to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::model::{MockQualityModel, ModelError};

    fn headers() -> Vec<String> {
        [
            "fixed acidity", "volatile acidity", "citric acid", "residual sugar", "chlorides",
            "free sulfur dioxide", "total sulfur dioxide", "density", "pH", "sulphates",
            "alcohol", "quality",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn cells(alcohol: &str) -> Vec<String> {
        [
            "7.4", "0.7", "0", "1.9", "0.076", "11", "34", "0.9978", "3.51", "0.56", alcohol, "5",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn raw(index: usize, alcohol: &str) -> RawRow {
        RawRow {
            index,
            cells: Ok(cells(alcohol)),
        }
    }

    fn alcohol_scorer() -> Scorer {
        let mut mock = MockQualityModel::new();
        mock.expect_predict_many()
            .returning(|inputs| Ok(inputs.iter().map(|row| row[10] / 2.0).collect()));
        Scorer::new(Arc::new(mock))
    }

    #[test]
    fn test_mapping_accepts_spaced_headers() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        assert_eq!(mapping.position(Feature::VolatileAcidity), 1);
        assert_eq!(mapping.position(Feature::Alcohol), 10);
    }

    #[test]
    fn test_mapping_reports_missing_columns() {
        let mut partial = headers();
        partial.retain(|h| h != "pH" && h != "density");

        let err = ColumnMapping::from_headers(partial).unwrap_err();
        assert!(matches!(err, DomainError::Schema { .. }));
        assert_eq!(err.reason(), "Missing required columns: density, pH");
    }

    #[test]
    fn test_vector_rejects_ragged_row() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let err = mapping.vector(&cells("9.4")[..5]).unwrap_err();
        assert!(err.reason().contains("5 cells, expected 12"));
    }

    #[test]
    fn test_echo_keeps_original_headers() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let echoed = mapping.echo(&cells("abc"));

        assert_eq!(echoed["volatile acidity"], 0.7);
        assert_eq!(echoed["alcohol"], "abc");
        assert_eq!(echoed["quality"], 5.0);
    }

    #[test]
    fn test_score_chunk_flags_only_bad_row() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let rows = vec![raw(0, "9.4"), raw(1, "strong"), raw(2, "12.0")];

        let scored = score_chunk(&alcohol_scorer(), &mapping, rows);

        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].predicted_quality(), Some(4.7));
        assert!(scored[1].is_failed());
        assert!(scored[1].error().unwrap().contains("alcohol"));
        assert_eq!(scored[2].predicted_quality(), Some(6.0));
        assert_eq!(
            scored.iter().map(|r| r.row_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_score_chunk_falls_back_to_single_rows() {
        let mut mock = MockQualityModel::new();
        mock.expect_predict_many()
            .returning(|_| Err(ModelError::Failed("batch kernel unavailable".to_string())));
        mock.expect_predict_one().returning(|row| {
            if row[10] > 10.0 {
                Err(ModelError::Failed("out of support".to_string()))
            } else {
                Ok(5.0)
            }
        });

        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let scored = score_chunk(
            &Scorer::new(Arc::new(mock)),
            &mapping,
            vec![raw(0, "9.4"), raw(1, "12.0")],
        );

        assert_eq!(scored[0].predicted_quality(), Some(5.0));
        assert_eq!(scored[1].error(), Some("out of support"));
    }

    #[test]
    fn test_undecodable_record_is_row_error() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let rows = vec![
            RawRow {
                index: 0,
                cells: Err("invalid UTF-8".to_string()),
            },
            raw(1, "9.4"),
        ];

        let scored = score_chunk(&alcohol_scorer(), &mapping, rows);
        assert_eq!(scored[0].error(), Some("invalid UTF-8"));
        assert!(scored[0].fields.is_empty());
        assert!(!scored[1].is_failed());
    }

    #[test]
    fn test_batch_row_serialization() {
        let mapping = ColumnMapping::from_headers(headers()).unwrap();
        let scored = score_chunk(
            &alcohol_scorer(),
            &mapping,
            vec![raw(4, "9.4"), raw(5, "n/a")],
        );

        let ok = serde_json::to_value(&scored[0]).unwrap();
        assert_eq!(ok["predicted_quality"], 4.7);
        assert_eq!(ok["row_index"], 4);
        assert_eq!(ok["volatile acidity"], 0.7);
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(&scored[1]).unwrap();
        assert!(failed["predicted_quality"].is_null());
        assert!(failed["error"].as_str().unwrap().contains("not numeric"));
    }
}
