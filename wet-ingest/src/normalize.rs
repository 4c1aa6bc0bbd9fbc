//! Schema normalizer: maps whatever column layout a transaction file has onto
//! the canonical columns.
//!
//! Steps, in order: trim names, rename legacy headers, disambiguate
//! duplicates, fold the spaced amount column into the canonical one, add any
//! missing required column with its default, then coerce required-column
//! values to their kind. Never fails; running it twice changes nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::columns::{self, AMOUNT, AMOUNT_SPACED, ColumnKind, REQUIRED};
use crate::table::Table;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

pub fn normalize(mut table: Table) -> Table {
    let renamed: Vec<String> = table
        .columns
        .iter()
        .map(|c| columns::canonical_name(c.trim()).to_string())
        .collect();
    table.columns = deduplicate_columns(&renamed);

    if !table.has_column(AMOUNT) {
        if let Some(i) = table.column_index(AMOUNT_SPACED) {
            debug!("using '{AMOUNT_SPACED}' as '{AMOUNT}'");
            table.columns[i] = AMOUNT.to_string();
        }
    }

    for (name, kind) in REQUIRED {
        if !table.has_column(name) {
            debug!("synthesizing missing column '{name}'");
            table.push_column(*name, default_value(*kind));
        }
    }

    for (name, kind) in REQUIRED {
        let Some(i) = table.column_index(name) else { continue };
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(i) {
                *cell = coerce(*kind, cell);
            }
        }
    }

    table
}

/// Suffix repeated names with `.1`, `.2`, ... in order of appearance; the first keeps its name.
pub fn deduplicate_columns(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for col in columns {
        if !out.contains(col) {
            out.push(col.clone());
            continue;
        }
        let mut n = 1;
        let name = loop {
            let candidate = format!("{col}.{n}");
            if !out.contains(&candidate) && !columns.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        out.push(name);
    }
    out
}

pub fn default_value(kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Date => Value::Null,
        ColumnKind::Number => Value::from(0),
        ColumnKind::Text => Value::String(String::new()),
    }
}

/// Coerce one cell. Numbers that don't parse and dates that don't parse become null.
pub fn coerce(kind: ColumnKind, value: &Value) -> Value {
    match kind {
        ColumnKind::Number => match parse_number(value) {
            Some(_) if value.is_number() => value.clone(),
            Some(n) => Value::from(n),
            None => Value::Null,
        },
        ColumnKind::Date => match value.as_str().and_then(parse_date) {
            Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        },
        ColumnKind::Text => Value::String(text_of(value)),
    }
}

/// A finite number from a JSON number or numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.date())
}

pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::export_columns;
    use serde_json::json;

    fn legacy_table() -> Table {
        Table::from_records(&[
            json!({
                " Date ": "2024-03-04",
                "Amount(Kes)": "1000",
                "Category": "Salary",
                "item description (money in)": "Salary",
            }),
            json!({
                "Date": "03/10/2024",
                "Amount(Kes)": "lots",
                "Sub Category": "Market",
                "Payment Method": "Cash",
            }),
        ])
    }

    #[test]
    fn test_required_columns_present() {
        let t = normalize(legacy_table());
        for col in export_columns() {
            assert!(t.has_column(col), "missing {col}");
        }
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_values_coerced() {
        let t = normalize(legacy_table());
        assert_eq!(t.get(0, "amount(kes)"), Some(&json!(1000.0)));
        assert_eq!(t.get(1, "amount(kes)"), Some(&Value::Null));
        assert_eq!(t.get(0, "transaction fees"), Some(&json!(0)));
        assert_eq!(t.get(1, "category"), Some(&json!("")));
        assert_eq!(t.get(0, "item description (money out)"), Some(&json!("")));
    }

    #[test]
    fn test_duplicate_names_after_trim() {
        // " Date " and "Date" both become "date"; the second gets a suffix.
        let t = normalize(legacy_table());
        assert_eq!(t.get(0, "date"), Some(&json!("2024-03-04")));
        assert_eq!(t.get(1, "date.1"), Some(&json!("03/10/2024")));
        assert_eq!(t.get(1, "date"), Some(&Value::Null));
    }

    #[test]
    fn test_idempotent() {
        let once = normalize(legacy_table());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);

        let empty = normalize(Table::default());
        assert_eq!(normalize(empty.clone()), empty);
        assert_eq!(empty.columns.len(), REQUIRED.len());
    }

    #[test]
    fn test_spaced_amount_synonym() {
        let t = normalize(Table::from_records(&[json!({"amount (kes)": 250, "date": "2024-01-02"})]));
        assert!(!t.has_column("amount (kes)"));
        assert_eq!(t.get(0, "amount(kes)"), Some(&json!(250)));

        // Canonical column wins; the spaced one stays as an extra column.
        let t = normalize(Table::from_records(&[json!({"amount (kes)": 1, "amount(kes)": 2})]));
        assert_eq!(t.get(0, "amount(kes)"), Some(&json!(2)));
        assert!(t.has_column("amount (kes)"));
    }

    #[test]
    fn test_deduplicate_columns() {
        let cols: Vec<String> = ["a", "b", "a", "a", "a.1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(deduplicate_columns(&cols), vec!["a", "b", "a.2", "a.3", "a.1"]);
        let unique: Vec<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(deduplicate_columns(&unique), unique);
    }

    #[test]
    fn test_parse_date_formats() {
        let want = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(parse_date("2024-03-04"), Some(want));
        assert_eq!(parse_date("2024-03-04T10:30:00"), Some(want));
        assert_eq!(parse_date("2024-03-04 10:30:00"), Some(want));
        assert_eq!(parse_date("03/04/2024"), Some(want));
        assert_eq!(parse_date("Mar 04, 2024"), Some(want));
        assert_eq!(parse_date("someday"), None);
        assert_eq!(parse_date(""), None);
    }
}
