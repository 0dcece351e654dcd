// src/clean/batch.rs
use super::columns::*;
use super::convert::{
    cell_to_datetime, cell_to_exact_i64, cell_to_f64, cell_to_i64, cell_to_text, stringify,
};
use crate::load::Cell;
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{
        ArrayRef, AsArray, Float64Array, Float64Builder, Int64Array, Int64Builder,
        StringArray, StringBuilder, TimestampMicrosecondBuilder,
    },
    compute::{cast, kernels::numeric::mul},
    datatypes::{DataType, Field, Float64Type, Schema, SchemaRef, TimeUnit},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// Output layout: source column order with the derived `total_amount` last.
pub fn transactions_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(INVOICE_NO, DataType::Utf8, false),
        Field::new(STOCK_CODE, DataType::Utf8, false),
        Field::new(DESCRIPTION, DataType::Utf8, false),
        Field::new(QUANTITY, DataType::Int64, false),
        Field::new(
            INVOICE_DATE,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
        Field::new(UNIT_PRICE, DataType::Float64, false),
        Field::new(CUSTOMER_ID, DataType::Int64, false),
        Field::new(COUNTRY, DataType::Utf8, false),
        Field::new(TOTAL_AMOUNT, DataType::Float64, false),
    ]))
}

/// Convert filtered rows into the typed output batch.
///
/// Expects rows that already passed [`super::filter::filter_rows`]; a missing quantity,
/// price or customer id here is treated as corrupt input. Text columns are never null;
/// missing cells are stringified the way pandas `astype(str)` renders them.
pub fn build_transactions_batch(rows: &[Vec<Cell>], cols: &ColumnIndex) -> Result<RecordBatch> {
    let n = rows.len();
    let mut invoice_no = StringBuilder::with_capacity(n, n * 8);
    let mut stock_code = StringBuilder::with_capacity(n, n * 8);
    let mut description = StringBuilder::with_capacity(n, n * 32);
    let mut quantity = Int64Builder::with_capacity(n);
    let mut invoice_date = TimestampMicrosecondBuilder::with_capacity(n);
    let mut unit_price = Float64Builder::with_capacity(n);
    let mut customer_id = Int64Builder::with_capacity(n);
    let mut country = StringBuilder::with_capacity(n, n * 16);

    for (row, cells) in rows.iter().enumerate() {
        let invoice = cell_to_text(&cells[cols.invoice_no])
            .ok_or_else(|| anyhow!("column {}: row {}: missing invoice number", INVOICE_NO, row))?;
        let ctx = || format!("converting invoice {}", invoice);

        let date =
            cell_to_datetime(&cells[cols.invoice_date], INVOICE_DATE, row).with_context(ctx)?;
        let cust = cell_to_i64(&cells[cols.customer_id], CUSTOMER_ID, row).with_context(ctx)?;
        let qty = cell_to_exact_i64(&cells[cols.quantity], QUANTITY, row).with_context(ctx)?;
        let price = cell_to_f64(&cells[cols.unit_price], UNIT_PRICE, row).with_context(ctx)?;
        let (Some(qty), Some(price), Some(cust)) = (qty, price, cust) else {
            return Err(anyhow!(
                "row {} (invoice {}) reached conversion with a missing value",
                row,
                invoice
            ));
        };

        invoice_date.append_option(date.map(|d| d.and_utc().timestamp_micros()));
        customer_id.append_value(cust);
        quantity.append_value(qty);
        unit_price.append_value(price);
        description.append_value(stringify(&cells[cols.description]));
        stock_code.append_value(stringify(&cells[cols.stock_code]));
        country.append_value(stringify(&cells[cols.country]));
        invoice_no.append_value(invoice);
    }

    let quantity = quantity.finish();
    let unit_price = unit_price.finish();
    let total_amount = derive_total_amount(&quantity, &unit_price)?;
    let description = trim_strings(&description.finish());

    let columns: Vec<ArrayRef> = vec![
        Arc::new(invoice_no.finish()),
        Arc::new(stock_code.finish()),
        Arc::new(description),
        Arc::new(quantity),
        Arc::new(invoice_date.finish()),
        Arc::new(unit_price),
        Arc::new(customer_id.finish()),
        Arc::new(country.finish()),
        Arc::new(total_amount),
    ];

    RecordBatch::try_new(transactions_schema(), columns)
        .context("building transactions RecordBatch")
}

/// `quantity * unit_price`, element-wise, in f64.
pub fn derive_total_amount(
    quantity: &Int64Array,
    unit_price: &Float64Array,
) -> Result<Float64Array> {
    let quantity = cast(quantity, &DataType::Float64).context("casting quantity to Float64")?;
    let total = mul(&quantity, unit_price).context("multiplying quantity by unit_price")?;
    Ok(total.as_primitive::<Float64Type>().clone())
}

/// Trim surrounding whitespace from every non-null value.
pub fn trim_strings(arr: &StringArray) -> StringArray {
    arr.iter().map(|opt| opt.map(str::trim)).collect()
}
