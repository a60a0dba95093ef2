//! Score command - batch scoring of a file without the HTTP server

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::Scorer;
use crate::infrastructure::batch::BatchIngestor;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::model::load_model;

/// Arguments for the score command
#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// Delimited file with one wine per row
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the JSON rows (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Model artifact (overrides config)
    #[arg(long)]
    pub model: Option<PathBuf>,
}

/// Score every row of the input file through the batch pipeline
pub async fn run(args: ScoreArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(model) = &args.model {
        config.model.path = model.clone();
    }

    init_logging(&config.logging);
    config.validate().context("Invalid configuration")?;

    let model = load_model(&config.model.path)?;
    let ingestor = BatchIngestor::new(Arc::new(Scorer::new(model)), config.batch.clone());

    let data = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;

    let rows = ingestor.ingest(Bytes::from(data)).await?;
    let failed = rows.iter().filter(|row| row.is_failed()).count();

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    writer.flush()?;

    info!(rows = rows.len(), failed, "Scoring complete");

    Ok(())
}
