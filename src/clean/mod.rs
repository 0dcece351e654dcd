// src/clean/mod.rs
pub mod batch;
pub mod columns;
pub mod convert;
pub mod filter;

pub use batch::transactions_schema;
pub use columns::ColumnIndex;
pub use filter::FilterStats;

use crate::load::RawTable;
use anyhow::Result;
use arrow::record_batch::RecordBatch;
use tracing::{debug, info};

#[derive(Debug)]
pub struct CleanOutput {
    pub batch: RecordBatch,
    pub stats: FilterStats,
}

impl CleanOutput {
    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.batch.num_rows(), self.batch.num_columns())
    }
}

/// Normalize headers, drop invalid rows, coerce types and derive `total_amount`.
///
/// Any conversion failure aborts the whole table; there is no per-row recovery.
#[tracing::instrument(level = "info", skip(raw), fields(rows = raw.rows.len()))]
pub fn clean_table(raw: RawTable) -> Result<CleanOutput> {
    let headers = columns::normalize_headers(&raw.headers);
    let cols = ColumnIndex::resolve(&headers)?;

    let required = cols.positions();
    for (i, name) in headers.iter().enumerate() {
        if !required.contains(&i) {
            debug!(column = %name, "dropping column outside the transaction schema");
        }
    }

    let (rows, stats) = filter::filter_rows(raw.rows, &cols)?;
    info!(
        input = stats.input_rows,
        missing_customer = stats.missing_customer,
        cancelled = stats.cancelled,
        non_positive_quantity = stats.non_positive_quantity,
        non_positive_price = stats.non_positive_price,
        kept = stats.output_rows,
        "filtered rows"
    );

    let batch = batch::build_transactions_batch(&rows, &cols)?;
    Ok(CleanOutput { batch, stats })
}
