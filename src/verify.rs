// src/verify.rs
//! Read a cleaned Parquet file back and check the output invariants.
use crate::clean::columns::*;
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, AsArray},
    datatypes::{Float64Type, Int64Type},
    record_batch::RecordBatch,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{fmt, fs::File, path::Path};

pub const EXPECTED_COLUMNS: [&str; 9] = [
    INVOICE_NO,
    STOCK_CODE,
    DESCRIPTION,
    QUANTITY,
    INVOICE_DATE,
    UNIT_PRICE,
    CUSTOMER_ID,
    COUNTRY,
    TOTAL_AMOUNT,
];

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Columns(Vec<String>),
    Row {
        row: usize,
        column: &'static str,
        reason: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Columns(found) => {
                write!(f, "column set {:?} != expected {:?}", found, EXPECTED_COLUMNS)
            }
            Violation::Row { row, column, reason } => {
                write!(f, "row {} {}: {}", row, column, reason)
            }
        }
    }
}

pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?
        .build()?;
    reader
        .map(|b| b.with_context(|| format!("decoding {}", path.display())))
        .collect()
}

/// Check one batch. `offset` is added to reported row numbers.
pub fn check_batch(batch: &RecordBatch, offset: usize) -> Result<Vec<Violation>> {
    let found: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let mut sorted_found = found.clone();
    sorted_found.sort();
    let mut sorted_expected: Vec<String> = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
    sorted_expected.sort();
    if sorted_found != sorted_expected {
        return Ok(vec![Violation::Columns(found)]);
    }

    let col = |name: &str| {
        batch
            .column_by_name(name)
            .ok_or_else(|| anyhow!("column {} vanished", name))
    };
    let invoice = col(INVOICE_NO)?
        .as_string_opt::<i32>()
        .ok_or_else(|| anyhow!("{} is not Utf8", INVOICE_NO))?;
    let quantity = col(QUANTITY)?
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| anyhow!("{} is not Int64", QUANTITY))?;
    let price = col(UNIT_PRICE)?
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| anyhow!("{} is not Float64", UNIT_PRICE))?;
    let customer = col(CUSTOMER_ID)?
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| anyhow!("{} is not Int64", CUSTOMER_ID))?;
    let total = col(TOTAL_AMOUNT)?
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| anyhow!("{} is not Float64", TOTAL_AMOUNT))?;

    let mut text_columns = Vec::with_capacity(3);
    for name in [STOCK_CODE, DESCRIPTION, COUNTRY] {
        let arr = col(name)?
            .as_string_opt::<i32>()
            .ok_or_else(|| anyhow!("{} is not Utf8", name))?;
        text_columns.push((name, arr));
    }

    let mut out = Vec::new();
    let mut flag = |row: usize, column: &'static str, reason: String| {
        out.push(Violation::Row {
            row: row + offset,
            column,
            reason,
        })
    };

    for row in 0..batch.num_rows() {
        if invoice.is_null(row) {
            flag(row, INVOICE_NO, "null".into());
        } else if invoice.value(row).starts_with('C') {
            flag(row, INVOICE_NO, format!("cancellation {}", invoice.value(row)));
        }
        if customer.is_null(row) {
            flag(row, CUSTOMER_ID, "null".into());
        }
        for &(name, arr) in &text_columns {
            if arr.is_null(row) {
                flag(row, name, "null".into());
            }
        }
        if quantity.is_null(row) || quantity.value(row) <= 0 {
            flag(row, QUANTITY, "not positive".into());
        }
        if price.is_null(row) || !(price.value(row) > 0.0) {
            flag(row, UNIT_PRICE, "not positive".into());
        }
        if !quantity.is_null(row) && !price.is_null(row) {
            let want = quantity.value(row) as f64 * price.value(row);
            if total.is_null(row) || total.value(row) != want {
                flag(row, TOTAL_AMOUNT, format!("expected {}", want));
            }
        }
    }
    Ok(out)
}

/// Read `path` and check every batch. Returns the row count and all violations.
pub fn verify_file<P: AsRef<Path>>(path: P) -> Result<(usize, Vec<Violation>)> {
    let mut rows = 0;
    let mut violations = Vec::new();
    for batch in read_parquet(path)? {
        violations.extend(check_batch(&batch, rows)?);
        rows += batch.num_rows();
    }
    Ok((rows, violations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::batch::{derive_total_amount, transactions_schema};
    use arrow::array::{
        ArrayRef, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
    };
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn batch(
        invoices: Vec<&str>,
        qty: Vec<i64>,
        price: Vec<f64>,
        total: Option<Vec<f64>>,
    ) -> RecordBatch {
        let n = invoices.len();
        let quantity = Int64Array::from(qty);
        let unit_price = Float64Array::from(price);
        let total = match total {
            Some(t) => Float64Array::from(t),
            None => derive_total_amount(&quantity, &unit_price).unwrap(),
        };
        let cols: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(invoices)),
            Arc::new(StringArray::from(vec![Some("85123A"); n])),
            Arc::new(StringArray::from(vec![Some("MUG"); n])),
            Arc::new(quantity),
            Arc::new(TimestampMicrosecondArray::from(vec![0i64; n])),
            Arc::new(unit_price),
            Arc::new(Int64Array::from(vec![12346i64; n])),
            Arc::new(StringArray::from(vec![Some("Spain"); n])),
            Arc::new(total),
        ];
        RecordBatch::try_new(transactions_schema(), cols).unwrap()
    }

    #[test]
    fn clean_batch_passes() {
        let b = batch(vec!["1", "2"], vec![3, 1], vec![2.5, 0.1], None);
        assert!(check_batch(&b, 0).unwrap().is_empty());
    }

    #[test]
    fn flags_each_broken_invariant() {
        let b = batch(
            vec!["C9", "2", "3"],
            vec![1, 0, 2],
            vec![1.0, 1.0, 2.0],
            Some(vec![1.0, 0.0, 5.0]),
        );
        let v = check_batch(&b, 10).unwrap();
        assert_eq!(v.len(), 3);
        assert!(matches!(v[0], Violation::Row { row: 10, column: INVOICE_NO, .. }));
        assert!(matches!(v[1], Violation::Row { row: 11, column: QUANTITY, .. }));
        assert!(matches!(v[2], Violation::Row { row: 12, column: TOTAL_AMOUNT, .. }));
    }

    #[test]
    fn flags_null_text_columns() {
        let clean = batch(vec!["1", "2"], vec![1, 1], vec![1.0, 1.0], None);
        let fields: Vec<Field> = clean
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone().with_nullable(true))
            .collect();
        let mut cols = clean.columns().to_vec();
        cols[1] = Arc::new(StringArray::from(vec![None, Some("85123A")]));
        cols[7] = Arc::new(StringArray::from(vec![Some("Spain"), None]));
        let b = RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).unwrap();

        let v = check_batch(&b, 0).unwrap();
        assert_eq!(v.len(), 2);
        assert!(matches!(v[0], Violation::Row { row: 0, column: STOCK_CODE, .. }));
        assert!(matches!(v[1], Violation::Row { row: 1, column: COUNTRY, .. }));
    }

    #[test]
    fn wrong_column_set() {
        let b = batch(vec!["1"], vec![1], vec![1.0], None);
        let b = b.project(&[0, 1, 2]).unwrap();
        let v = check_batch(&b, 0).unwrap();
        assert!(matches!(v.as_slice(), [Violation::Columns(_)]));
    }
}
