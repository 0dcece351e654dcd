// src/load/mod.rs
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, info};

/// One spreadsheet cell, detached from the workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Spreadsheet error value such as `#N/A`.
    Error(String),
}

impl Cell {
    /// Empty cells, error values and whitespace-only text all count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(d: &Data) -> Self {
        match d {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => Cell::DateTime(ndt),
                None => Cell::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RawTable {
    /// Header row exactly as it appears in the sheet.
    pub headers: Vec<String>,
    /// Data rows, each padded or truncated to `headers.len()` cells.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }
}

/// Read the first worksheet of `path` into memory. The first row is the header row.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(anyhow!("raw dataset not found: {}", path.display()));
    }
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook {} has no worksheets", path.display()))?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let table = table_from_range(&range)
        .with_context(|| format!("decoding first worksheet of {}", path.display()))?;
    let (rows, cols) = table.shape();
    info!(rows, cols, "loaded worksheet");
    Ok(table)
}

/// Split a sheet range into a header row plus data rows.
pub fn table_from_range(range: &Range<Data>) -> Result<RawTable> {
    let mut iter = range.rows();
    let header_row = iter.next().ok_or_else(|| anyhow!("worksheet is empty"))?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, d)| header_name(i, &Cell::from(d)))
        .collect();

    let width = headers.len();
    let mut rows = Vec::with_capacity(range.height().saturating_sub(1));
    let mut blank = 0usize;
    for row in iter {
        let mut cells: Vec<Cell> = row.iter().take(width).map(Cell::from).collect();
        if cells.iter().all(|c| matches!(c, Cell::Empty)) {
            blank += 1;
            continue;
        }
        cells.resize(width, Cell::Empty);
        rows.push(cells);
    }
    if blank > 0 {
        debug!(blank, "skipped fully blank rows");
    }

    Ok(RawTable { headers, rows })
}

fn header_name(idx: usize, cell: &Cell) -> String {
    match crate::clean::convert::cell_to_text(cell) {
        Some(s) if !s.trim().is_empty() => s,
        _ => format!("Unnamed: {}", idx),
    }
}
