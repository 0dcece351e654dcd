// src/clean/filter.rs
use super::columns::{ColumnIndex, QUANTITY, UNIT_PRICE};
use super::convert::{cell_to_f64, cell_to_text};
use crate::load::Cell;
use anyhow::Result;

/// Rows removed by each filter, in the order the filters run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub input_rows: usize,
    pub missing_customer: usize,
    pub cancelled: usize,
    pub non_positive_quantity: usize,
    pub non_positive_price: usize,
    pub output_rows: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// A leading `C` on the invoice number marks a cancellation / credit note.
pub fn is_cancellation(invoice: &Cell) -> bool {
    cell_to_text(invoice).is_some_and(|s| s.starts_with('C'))
}

/// Missing values never count as positive.
pub fn is_positive(cell: &Cell, column: &str, row: usize) -> Result<bool> {
    Ok(cell_to_f64(cell, column, row)?.is_some_and(|v| v > 0.0))
}

/// Apply the row filters in order: customer id present, not a cancellation,
/// quantity > 0, unit price > 0. Surviving rows keep their relative order.
pub fn filter_rows(
    rows: Vec<Vec<Cell>>,
    cols: &ColumnIndex,
) -> Result<(Vec<Vec<Cell>>, FilterStats)> {
    let mut stats = FilterStats {
        input_rows: rows.len(),
        ..FilterStats::default()
    };

    let mut kept = Vec::with_capacity(rows.len());
    for (row, cells) in rows.into_iter().enumerate() {
        if cells[cols.customer_id].is_missing() {
            stats.missing_customer += 1;
        } else if is_cancellation(&cells[cols.invoice_no]) {
            stats.cancelled += 1;
        } else if !is_positive(&cells[cols.quantity], QUANTITY, row)? {
            stats.non_positive_quantity += 1;
        } else if !is_positive(&cells[cols.unit_price], UNIT_PRICE, row)? {
            stats.non_positive_price += 1;
        } else {
            kept.push(cells);
        }
    }

    stats.output_rows = kept.len();
    Ok((kept, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLS: ColumnIndex = ColumnIndex {
        invoice_no: 0,
        stock_code: 1,
        description: 2,
        quantity: 3,
        invoice_date: 4,
        unit_price: 5,
        customer_id: 6,
        country: 7,
    };

    fn row(invoice: Cell, quantity: Cell, price: Cell, customer: Cell) -> Vec<Cell> {
        vec![
            invoice,
            Cell::Text("85048".into()),
            Cell::Text("LED CANDLE".into()),
            quantity,
            Cell::Text("2010-12-01 08:26:00".into()),
            price,
            customer,
            Cell::Text("United Kingdom".into()),
        ]
    }

    fn good() -> Vec<Cell> {
        row(Cell::Int(489434), Cell::Int(12), Cell::Float(6.95), Cell::Float(13085.0))
    }

    #[test]
    fn negative_quantity_dropped() {
        let rows = vec![
            good(),
            row(Cell::Int(489435), Cell::Int(-5), Cell::Float(1.0), Cell::Int(1)),
        ];
        let (kept, stats) = filter_rows(rows, &COLS).unwrap();
        assert_eq!(kept, vec![good()]);
        assert_eq!(stats.non_positive_quantity, 1);
    }

    #[test]
    fn cancellation_dropped() {
        let rows = vec![
            row(Cell::Text("C12345".into()), Cell::Int(1), Cell::Float(1.0), Cell::Int(1)),
            good(),
        ];
        let (kept, stats) = filter_rows(rows, &COLS).unwrap();
        assert_eq!(kept, vec![good()]);
        assert_eq!(stats.cancelled, 1);
        // only a leading capital C marks a cancellation
        assert!(!is_cancellation(&Cell::Text("A563185".into())));
        assert!(!is_cancellation(&Cell::Text("c1".into())));
    }

    #[test]
    fn missing_customer_dropped() {
        let rows = vec![
            row(Cell::Int(1), Cell::Int(1), Cell::Float(1.0), Cell::Empty),
            row(Cell::Int(2), Cell::Int(1), Cell::Float(1.0), Cell::Text(" ".into())),
            good(),
        ];
        let (kept, stats) = filter_rows(rows, &COLS).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(stats.missing_customer, 2);
    }

    #[test]
    fn zero_and_missing_prices_dropped() {
        let rows = vec![
            row(Cell::Int(1), Cell::Int(1), Cell::Float(0.0), Cell::Int(1)),
            row(Cell::Int(2), Cell::Int(1), Cell::Empty, Cell::Int(1)),
            row(Cell::Int(3), Cell::Int(0), Cell::Float(2.0), Cell::Int(1)),
            good(),
        ];
        let (kept, stats) = filter_rows(rows, &COLS).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(stats.non_positive_price, 2);
        assert_eq!(stats.non_positive_quantity, 1);
        assert_eq!(stats.dropped(), 3);
        assert_eq!(stats.output_rows, 1);
    }

    #[test]
    fn non_numeric_quantity_fails() {
        let lots = Cell::Text("lots".into());
        let rows = vec![row(Cell::Int(1), lots, Cell::Float(1.0), Cell::Int(1))];
        assert!(filter_rows(rows, &COLS).is_err());
    }

    #[test]
    fn infinite_price_text_fails() {
        let inf = Cell::Text("inf".into());
        let rows = vec![row(Cell::Int(1), Cell::Int(2), inf, Cell::Int(1))];
        let err = filter_rows(rows, &COLS).unwrap_err();
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn earlier_filters_shield_later_checks() {
        // the bad quantity never gets inspected because the customer id is missing
        let lots = Cell::Text("lots".into());
        let rows = vec![row(Cell::Int(1), lots, Cell::Float(1.0), Cell::Empty)];
        let (kept, stats) = filter_rows(rows, &COLS).unwrap();
        assert!(kept.is_empty());
        assert_eq!(stats.missing_customer, 1);
    }
}
