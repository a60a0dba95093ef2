//! CLI module for the wine quality engine
//!
//! - `serve`: HTTP API server
//! - `score`: offline batch scoring of a delimited file

pub mod score;
pub mod serve;

use clap::{Parser, Subcommand};

/// Wine Quality Engine - model serving and dataset analytics for wine chemistry
#[derive(Parser)]
#[command(name = "wine-quality-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Score a CSV file offline and write the rows as JSON
    Score(score::ScoreArgs),
}
