// src/clean/convert.rs
use crate::load::Cell;
use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Text layouts tried, in order, for invoice dates stored as strings.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Text written for a missing value in a stringified column.
pub const MISSING_TEXT: &str = "nan";

/// Render a cell as text. Missing cells give `None`.
///
/// Integral floats print without a fraction so numeric codes read the same whether the
/// sheet stored them as numbers or as text.
pub fn cell_to_text(cell: &Cell) -> Option<String> {
    if cell.is_missing() {
        return None;
    }
    match cell {
        Cell::Text(s) => Some(s.clone()),
        Cell::Int(i) => Some(i.to_string()),
        Cell::Float(f) => Some(format_float(*f)),
        Cell::Bool(true) => Some("True".to_string()),
        Cell::Bool(false) => Some("False".to_string()),
        Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        Cell::Empty | Cell::Error(_) => None,
    }
}

/// Render a cell for a text output column. Never null: empty and error cells become
/// [`MISSING_TEXT`], text cells are kept verbatim (including whitespace-only ones).
pub fn stringify(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        other => cell_to_text(other).unwrap_or_else(|| MISSING_TEXT.to_string()),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Read a numeric cell. Numeric text is accepted; anything else non-missing is an error.
pub fn cell_to_f64(cell: &Cell, column: &str, row: usize) -> Result<Option<f64>> {
    match cell {
        c if c.is_missing() => Ok(None),
        Cell::Int(i) => Ok(Some(*i as f64)),
        Cell::Float(f) => Ok(Some(*f)),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => bail!("column {}: row {}: expected a number, found {:?}", column, row, s),
        },
        other => bail!("column {}: row {}: expected a number, found {:?}", column, row, other),
    }
}

/// Read a numeric cell as an integer, truncating any fraction toward zero.
pub fn cell_to_i64(cell: &Cell, column: &str, row: usize) -> Result<Option<i64>> {
    if let Cell::Int(i) = cell {
        return Ok(Some(*i));
    }
    match cell_to_f64(cell, column, row)? {
        None => Ok(None),
        Some(f) if f.is_finite() && f.abs() < 9.2e18 => Ok(Some(f.trunc() as i64)),
        Some(f) => bail!("column {}: row {}: {} does not fit a 64-bit integer", column, row, f),
    }
}

/// Like [`cell_to_i64`] but rejects values with a fractional part.
pub fn cell_to_exact_i64(cell: &Cell, column: &str, row: usize) -> Result<Option<i64>> {
    if let Some(f) = match cell {
        Cell::Int(_) => None,
        other => cell_to_f64(other, column, row)?,
    } {
        if f.fract() != 0.0 {
            bail!("column {}: row {}: expected a whole number, found {}", column, row, f);
        }
    }
    cell_to_i64(cell, column, row)
}

/// Parse an invoice-date cell. Missing cells give `None`; unparseable values are an error.
pub fn cell_to_datetime(cell: &Cell, column: &str, row: usize) -> Result<Option<NaiveDateTime>> {
    let parsed = match cell {
        c if c.is_missing() => return Ok(None),
        Cell::DateTime(dt) => Some(*dt),
        Cell::Float(f) => excel_serial_to_datetime(*f),
        Cell::Int(i) => excel_serial_to_datetime(*i as f64),
        Cell::Text(s) => parse_datetime_str(s),
        _ => None,
    };
    match parsed {
        Some(dt) => Ok(Some(dt)),
        None => bail!("column {}: row {}: cannot parse {:?} as a date/time", column, row, cell),
    }
}

/// Parse the textual date layouts found in retail exports.
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert a 1900-system spreadsheet serial (days since 1899-12-30) to a datetime,
/// rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
