//! Fixed-column CSV export of transactions.
//!
//! Header: date, week, amount(kes), transaction fees, transaction type,
//! category, subcategory, payment method, item description (money in),
//! item description (money out)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use wet_core::Transaction;
use wet_ingest::columns::export_columns;
use wet_ingest::{Table, to_transactions};

/// Normalize `table` and write it as CSV. Returns the number of data rows.
pub fn export_csv<W: Write>(table: Table, writer: W) -> Result<usize> {
    export_transactions(&to_transactions(table), writer)
}

/// Write transactions as CSV. `week` always comes from `date`, never from the record.
pub fn export_transactions<W: Write>(txns: &[Transaction], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(export_columns()).context("writing CSV header")?;
    for t in txns {
        wtr.write_record(export_row(t))?;
    }
    wtr.flush()?;
    Ok(txns.len())
}

/// Export to a file, replacing it.
pub fn export_to_path(txns: &[Transaction], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let n = export_transactions(txns, file).with_context(|| format!("writing {}", path.display()))?;
    info!("exported {} transactions to {}", n, path.display());
    Ok(n)
}

fn export_row(t: &Transaction) -> [String; 10] {
    [
        t.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        t.iso_week().map(|w| w.to_string()).unwrap_or_default(),
        number(t.amount),
        number(t.transaction_fees),
        t.transaction_type.clone(),
        t.category.clone(),
        t.subcategory.clone(),
        t.payment_method.clone(),
        t.description_in.clone(),
        t.description_out.clone(),
    ]
}

fn number(n: Option<f64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export_str(table: Table) -> String {
        let mut out = Vec::new();
        export_csv(table, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_and_column_order() {
        let csv = export_str(Table::from_records(&[json!({
            "item description (money out)": "Fuel, full tank",
            "Category": "Transport",
            "Date": "2025-03-04",
            "Amount(Kes)": 2500,
            "week": 1,
        })]));
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,week,amount(kes),transaction fees,transaction type,category,subcategory,payment method,item description (money in),item description (money out)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-03-04,10,2500,0,,Transport,,,,\"Fuel, full tank\""
        );
    }

    #[test]
    fn test_missing_date_and_bad_amount_export_blank() {
        let csv = export_str(Table::from_records(&[json!({"amount(kes)": "n/a", "category": "Misc"})]));
        assert_eq!(csv.lines().nth(1).unwrap(), ",,,0,,Misc,,,,");
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let csv = export_str(Table::default());
        assert_eq!(csv.lines().count(), 1);
    }
}
