// src/clean/columns.rs
use anyhow::{anyhow, Result};
use tracing::warn;

pub const INVOICE_NO: &str = "invoice_no";
pub const STOCK_CODE: &str = "stock_code";
pub const DESCRIPTION: &str = "description";
pub const QUANTITY: &str = "quantity";
pub const INVOICE_DATE: &str = "invoice_date";
pub const UNIT_PRICE: &str = "unit_price";
pub const CUSTOMER_ID: &str = "customer_id";
pub const COUNTRY: &str = "country";
pub const TOTAL_AMOUNT: &str = "total_amount";

/// Source header (already stripped + lowercased) → canonical name.
/// Headers not listed keep their normalized form.
pub const RENAMES: &[(&str, &str)] = &[
    ("invoice", INVOICE_NO),
    ("stockcode", STOCK_CODE),
    ("invoicedate", INVOICE_DATE),
    ("price", UNIT_PRICE),
    ("customer id", CUSTOMER_ID),
];

/// Strip surrounding whitespace, lowercase, then apply [`RENAMES`].
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    RENAMES
        .iter()
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(lowered)
}

pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h)).collect()
}

/// Positions of the eight source columns inside a normalized header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub invoice_no: usize,
    pub stock_code: usize,
    pub description: usize,
    pub quantity: usize,
    pub invoice_date: usize,
    pub unit_price: usize,
    pub customer_id: usize,
    pub country: usize,
}

impl ColumnIndex {
    /// Locate every required column; the first missing one is an error.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            let mut hits = headers.iter().enumerate().filter(|(_, h)| h.as_str() == name);
            let (idx, _) = hits.next().ok_or_else(|| {
                anyhow!(
                    "required column {:?} not found after normalization; columns present: {:?}",
                    name,
                    headers
                )
            })?;
            if hits.next().is_some() {
                warn!(column = name, "duplicate column, using the first occurrence");
            }
            Ok(idx)
        };

        Ok(ColumnIndex {
            invoice_no: find(INVOICE_NO)?,
            stock_code: find(STOCK_CODE)?,
            description: find(DESCRIPTION)?,
            quantity: find(QUANTITY)?,
            invoice_date: find(INVOICE_DATE)?,
            unit_price: find(UNIT_PRICE)?,
            customer_id: find(CUSTOMER_ID)?,
            country: find(COUNTRY)?,
        })
    }

    pub fn positions(&self) -> [usize; 8] {
        [
            self.invoice_no,
            self.stock_code,
            self.description,
            self.quantity,
            self.invoice_date,
            self.unit_price,
            self.customer_id,
            self.country,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_headers() -> Vec<String> {
        [
            "Invoice",
            "StockCode",
            "Description",
            "Quantity",
            "InvoiceDate",
            "Price",
            "Customer ID",
            "Country",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn renames_source_headers() {
        assert_eq!(
            normalize_headers(&source_headers()),
            vec![
                "invoice_no",
                "stock_code",
                "description",
                "quantity",
                "invoice_date",
                "unit_price",
                "customer_id",
                "country"
            ]
        );
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(normalize_header("  CUSTOMER ID "), "customer_id");
        assert_eq!(normalize_header("\tinvoiceDate"), "invoice_date");
        assert_eq!(normalize_header(" Notes "), "notes");
        // inner whitespace is significant
        assert_eq!(normalize_header("Customer  ID"), "customer  id");
    }

    #[test]
    fn resolves_in_any_order() {
        let mut headers = normalize_headers(&source_headers());
        headers.reverse();
        headers.insert(0, "extra".into());
        let idx = ColumnIndex::resolve(&headers).unwrap();
        assert_eq!(idx.country, 1);
        assert_eq!(idx.invoice_no, 8);
    }

    #[test]
    fn missing_column_is_named() {
        let mut headers = normalize_headers(&source_headers());
        headers.retain(|h| h != "unit_price");
        let err = ColumnIndex::resolve(&headers).unwrap_err();
        assert!(err.to_string().contains("\"unit_price\""));
    }
}
