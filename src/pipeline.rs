// src/pipeline.rs
use crate::{
    clean::{self, FilterStats},
    config::Config,
    load, write,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub initial_shape: (usize, usize),
    pub cleaned_shape: (usize, usize),
    pub stats: FilterStats,
    pub output_path: PathBuf,
    pub bytes_written: u64,
}

/// Load the raw workbook, clean it, and write the Parquet table.
///
/// Prints the initial shape, the cleaned shape and the output path to stdout.
/// Nothing is written if any step before serialization fails.
pub fn run(config: &Config) -> Result<RunSummary> {
    println!("Loading raw dataset");
    let raw = load::load_workbook(&config.raw_path).context("loading raw dataset")?;
    let initial_shape = raw.shape();
    println!("Initial shape: ({}, {})", initial_shape.0, initial_shape.1);

    let cleaned = clean::clean_table(raw).context("cleaning transactions")?;
    let cleaned_shape = cleaned.shape();
    println!("Cleaned shape: ({}, {})", cleaned_shape.0, cleaned_shape.1);

    let props = write::writer_properties(config)?;
    let bytes_written = write::write_parquet(&cleaned.batch, &config.clean_path, props)
        .context("writing clean dataset")?;
    println!("Saved clean dataset to: {}", config.clean_path.display());

    info!(
        rows = cleaned_shape.0,
        dropped = cleaned.stats.dropped(),
        bytes = bytes_written,
        "pipeline complete"
    );
    Ok(RunSummary {
        initial_shape,
        cleaned_shape,
        stats: cleaned.stats,
        output_path: config.clean_path.clone(),
        bytes_written,
    })
}
