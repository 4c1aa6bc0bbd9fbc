use std::io::Read;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Loosely-typed rows as they come off disk: named columns, JSON cell values.
///
/// Column names may repeat until the table has been normalized. A cell is
/// `Value::Null` when the source record didn't have that field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from JSON objects. Columns are the union of keys in
    /// first-seen order; entries that are not objects are skipped.
    pub fn from_records(records: &[Value]) -> Self {
        let mut table = Table::default();
        let objects: Vec<&Map<String, Value>> = records
            .iter()
            .filter_map(|r| {
                let obj = r.as_object();
                if obj.is_none() {
                    warn!("skipping non-object transaction record: {r}");
                }
                obj
            })
            .collect();

        for obj in &objects {
            for key in obj.keys() {
                if !table.columns.iter().any(|c| c == key) {
                    table.columns.push(key.clone());
                }
            }
        }

        for obj in objects {
            let row = table
                .columns
                .iter()
                .map(|c| obj.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }
        debug!("table from {} records, {} columns", table.rows.len(), table.columns.len());
        table
    }

    /// One JSON object per row. With duplicate column names the last one wins.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, column `name`), if both exist.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)
    }

    /// Append a column, filling every row with `fill`.
    pub fn push_column(&mut self, name: impl Into<String>, fill: Value) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }
}

/// Read a CSV with a header row into a table of string cells.
pub fn read_csv_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading CSV row {}", i + 1))?;
        let row = (0..columns.len())
            .map(|c| match record.get(c) {
                Some(v) => Value::String(v.to_string()),
                None => Value::Null,
            })
            .collect();
        rows.push(row);
    }
    debug!("read {} CSV rows", rows.len());
    Ok(Table { columns, rows })
}
