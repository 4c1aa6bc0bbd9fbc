//! Normalized tables to typed, classified transactions.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;
use wet_core::{Direction, Transaction};

use crate::columns::{
    AMOUNT, CATEGORY, DATE, FEES, MONEY_IN, MONEY_OUT, PAYMENT_METHOD, SUBCATEGORY,
    TRANSACTION_TYPE, WEEK,
};
use crate::normalize::{normalize, parse_number, text_of};
use crate::store::{self, Loaded};
use crate::table::Table;

/// Normalize `table` and build one classified [`Transaction`] per row.
pub fn to_transactions(table: Table) -> Vec<Transaction> {
    let table = normalize(table);
    let txns: Vec<Transaction> = (0..table.len()).map(|i| row_to_transaction(&table, i)).collect();
    let unknown = txns.iter().filter(|t| !t.direction.is_known()).count();
    debug!("built {} transactions ({} without a direction)", txns.len(), unknown);
    txns
}

fn row_to_transaction(table: &Table, row: usize) -> Transaction {
    let cell = |name: &str| table.get(row, name).unwrap_or(&Value::Null);
    let text = |name: &str| text_of(cell(name));

    let date = cell(DATE)
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    let stored_week = parse_number(cell(WEEK))
        .filter(|w| w.fract() == 0.0 && (1.0..=53.0).contains(w))
        .map(|w| w as u32);

    let txn = Transaction {
        date,
        week: stored_week,
        amount: parse_number(cell(AMOUNT)),
        transaction_fees: parse_number(cell(FEES)),
        transaction_type: text(TRANSACTION_TYPE),
        category: text(CATEGORY),
        subcategory: text(SUBCATEGORY),
        payment_method: text(PAYMENT_METHOD),
        description_in: text(MONEY_IN),
        description_out: text(MONEY_OUT),
        direction: Direction::Unknown,
    };
    let week = txn.iso_week().or(txn.week);
    Transaction { week, ..txn }.classified()
}

/// Load a JSON transaction file. Returns the records as stored alongside the
/// classified transactions built from them, in the same order.
pub fn load_transactions(path: &Path) -> Loaded<(Vec<Value>, Vec<Transaction>)> {
    let Loaded { data, warning } = store::load(path);
    let txns = to_transactions(Table::from_records(&data));
    Loaded {
        data: (data, txns),
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_rows_become_transactions() {
        let table = Table::from_records(&[
            json!({
                "Date": "2024-03-04",
                "Amount(Kes)": 1000,
                "Transaction Type": "debit",
                "Category": "Salary",
                "Transaction Fees": 0,
                "item description (money in)": "Salary",
            }),
            json!({
                "Date": "2024-03-06",
                "Amount(Kes)": "200.5",
                "week": 99,
                "Category": "Food & Beverages",
                "item description (money out)": "Market run",
                "Transaction Fees": "bad",
            }),
            json!({"Category": "Misc"}),
        ]);

        let txns = to_transactions(table);
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].direction, Direction::Inflow);
        assert_eq!(txns[0].amount, Some(1000.0));
        assert_eq!(txns[0].week, Some(10));
        assert_eq!(txns[0].transaction_fees, Some(0.0));
        assert_eq!(txns[0].transaction_type, "debit");

        assert_eq!(txns[1].direction, Direction::Outflow);
        assert_eq!(txns[1].amount, Some(200.5));
        assert_eq!(txns[1].week, Some(10));
        assert_eq!(txns[1].transaction_fees, None);

        assert_eq!(txns[2].direction, Direction::Unknown);
        assert_eq!(txns[2].date, None);
        assert_eq!(txns[2].week, None);
        assert_eq!(txns[2].amount, None);
    }

    #[test]
    fn test_spaced_amount_column_is_read() {
        let txns = to_transactions(Table::from_records(&[json!({
            "date": "2024-03-06",
            "amount (kes)": 75,
            "item description (money out)": "Fare",
        })]));
        assert_eq!(txns[0].amount, Some(75.0));
        assert_eq!(txns[0].direction, Direction::Outflow);
    }

    #[test]
    fn test_record_roundtrip_through_table() {
        let table = Table::from_records(&[json!({
            "date": "2024-03-04",
            "amount(kes)": 1000.0,
            "category": "Salary",
            "subcategory": "Not applicable",
            "item description (money in)": "Salary",
        })]);
        let first = to_transactions(table);
        let again = to_transactions(Table::from_records(&[first[0].to_record()]));
        assert_eq!(first, again);
    }

    #[test]
    fn test_load_transactions_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_transactions.json");
        std::fs::write(
            &path,
            r#"[{"Date": "2024-03-04", "Amount(Kes)": 1000, "item description (money in)": "Salary"}]"#,
        )
        .unwrap();
        let loaded = load_transactions(&path);
        assert!(loaded.warning.is_none());
        let (records, txns) = loaded.data;
        assert_eq!(records[0]["Amount(Kes)"], 1000);
        assert_eq!(txns[0].direction, Direction::Inflow);

        std::fs::write(&path, "not json").unwrap();
        let loaded = load_transactions(&path);
        assert!(loaded.data.0.is_empty());
        assert!(loaded.data.1.is_empty());
        assert!(loaded.warning.is_some());
    }
}
