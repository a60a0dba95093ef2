//! Chunked batch scoring of uploaded tables

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::stream::{FuturesOrdered, StreamExt};
use tracing::{debug, info};

use crate::config::BatchConfig;
use crate::domain::{score_chunk, BatchRow, ColumnMapping, DomainError, RawRow, Scorer};
use crate::infrastructure::tabular::{open_reader, read_headers, record_cells};

/// Streams an uploaded table through the scorer in bounded chunks.
///
/// Rows are read lazily and at most `max_concurrent_chunks` chunks are
/// scored at a time on the blocking pool. Results come back in input
/// order. Dropping the returned future stops further chunks from being
/// dispatched.
#[derive(Debug, Clone)]
pub struct BatchIngestor {
    scorer: Arc<Scorer>,
    config: BatchConfig,
}

impl BatchIngestor {
    pub fn new(scorer: Arc<Scorer>, config: BatchConfig) -> Self {
        Self { scorer, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Score every data row of a delimited table.
    ///
    /// Header problems fail the whole request before any row is scored.
    /// Row problems are reported on the row itself.
    pub async fn ingest(&self, data: Bytes) -> Result<Vec<BatchRow>, DomainError> {
        let started = Instant::now();
        let mut reader = open_reader(&data[..]);
        let mapping = Arc::new(ColumnMapping::from_headers(read_headers(&mut reader)?)?);

        let chunk_size = self.config.chunk_size.max(1);
        let max_in_flight = self.config.max_concurrent_chunks.max(1);

        let mut records = reader.records().enumerate();
        let mut in_flight = FuturesOrdered::new();
        let mut results = Vec::new();
        let mut rows_read = 0usize;
        let mut exhausted = false;

        loop {
            while !exhausted && in_flight.len() < max_in_flight {
                let mut chunk = Vec::with_capacity(chunk_size);

                for (index, record) in records.by_ref().take(chunk_size) {
                    chunk.push(RawRow {
                        index,
                        cells: record
                            .map(|r| record_cells(&r))
                            .map_err(|e| format!("Unreadable row: {}", e)),
                    });
                }

                if chunk.len() < chunk_size {
                    exhausted = true;
                }
                if chunk.is_empty() {
                    break;
                }

                rows_read += chunk.len();
                if rows_read > self.config.max_rows {
                    return Err(DomainError::limit_exceeded(format!(
                        "Upload exceeds the maximum of {} rows",
                        self.config.max_rows
                    )));
                }

                debug!(rows = chunk.len(), first_row = chunk[0].index, "Dispatching batch chunk");

                let scorer = Arc::clone(&self.scorer);
                let mapping = Arc::clone(&mapping);
                in_flight.push_back(tokio::task::spawn_blocking(move || {
                    score_chunk(&scorer, &mapping, chunk)
                }));
            }

            match in_flight.next().await {
                Some(scored) => {
                    let scored = scored.map_err(|e| {
                        DomainError::internal(format!("Batch chunk aborted: {}", e))
                    })?;
                    results.extend(scored);
                }
                None => break,
            }
        }

        let failed = results.iter().filter(|row| row.is_failed()).count();
        info!(
            rows = results.len(),
            failed,
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch scored"
        );

        Ok(results)
    }
}
