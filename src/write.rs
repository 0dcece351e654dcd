// src/write.rs
use crate::config::Config;
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn writer_properties(config: &Config) -> Result<WriterProperties> {
    Ok(WriterProperties::builder()
        .set_compression(config.compression.to_parquet()?)
        .set_max_row_group_size(config.row_group_size.max(1))
        .set_dictionary_enabled(true)
        .build())
}

/// Write `batch` as a single Parquet file at `out_path`, creating parent directories.
///
/// The file is written to a sibling named `<file name>.tmp` and renamed into place, so
/// `out_path` is either the previous file or the complete new one. Returns the bytes
/// written.
#[tracing::instrument(
    level = "info",
    skip(batch, props),
    fields(path = %out_path.display(), rows = batch.num_rows())
)]
pub fn write_parquet(batch: &RecordBatch, out_path: &Path, props: WriterProperties) -> Result<u64> {
    if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        debug!(dir = %dir.display(), "ensured output dir exists");
    }

    let temp_path = temp_path_for(out_path);
    let result = write_file(batch, &temp_path, props).and_then(|()| {
        fs::rename(&temp_path, out_path).with_context(|| {
            format!(
                "renaming {} -> {}",
                temp_path.display(),
                out_path.display()
            )
        })
    });
    if let Err(e) = result {
        if temp_path.exists() {
            if let Err(rm) = fs::remove_file(&temp_path) {
                warn!(temp_path = %temp_path.display(), "could not remove temp file: {}", rm);
            }
        }
        return Err(e);
    }

    let bytes = fs::metadata(out_path)
        .with_context(|| format!("stat {}", out_path.display()))?
        .len();
    info!(bytes, "wrote parquet");
    Ok(bytes)
}

/// `t.parquet` -> `t.parquet.tmp`. Appending keeps the temp name distinct from
/// `out_path` whatever its extension.
fn temp_path_for(out_path: &Path) -> PathBuf {
    let mut name = out_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    out_path.with_file_name(name)
}

fn write_file(batch: &RecordBatch, path: &Path, props: WriterProperties) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("opening parquet writer")?;
    writer.write(batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
