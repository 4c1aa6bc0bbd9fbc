//! Totals, breakdowns and derived metrics over classified transactions.
//!
//! Amounts that could not be read as numbers are left out of every sum.
//! Sums start from `0.0` so an empty set totals to positive zero.
//! Undated records still count toward totals but not toward monthly figures.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::transaction::{Direction, Transaction};

/// Sum of `amount` over records going `direction`.
pub fn total(txns: &[Transaction], direction: Direction) -> f64 {
    txns.iter()
        .filter(|t| t.direction == direction)
        .filter_map(|t| t.amount)
        .fold(0.0, |a, b| a + b)
}

/// Sum of `amount` where category or subcategory mentions savings, any direction.
pub fn savings_total(txns: &[Transaction]) -> f64 {
    txns.iter()
        .filter(|t| mentions_savings(&t.category) || mentions_savings(&t.subcategory))
        .filter_map(|t| t.amount)
        .fold(0.0, |a, b| a + b)
}

fn mentions_savings(s: &str) -> bool {
    s.to_lowercase().contains("savings")
}

/// Sum of transaction fees over all records.
pub fn fees_total(txns: &[Transaction]) -> f64 {
    txns.iter().filter_map(|t| t.transaction_fees).fold(0.0, |a, b| a + b)
}

pub fn surplus(txns: &[Transaction]) -> f64 {
    total(txns, Direction::Inflow) - total(txns, Direction::Outflow)
}

/// Opening balance plus money in, minus money out, minus fees.
pub fn net_worth(txns: &[Transaction], opening_balance: f64) -> f64 {
    opening_balance + surplus(txns) - fees_total(txns)
}

/// Calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// January through December of `year`.
pub fn calendar_year(year: i32) -> Vec<YearMonth> {
    (1..=12).map(|month| YearMonth { year, month }).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub month: YearMonth,
    pub inflow: f64,
    pub outflow: f64,
}

impl MonthlyRow {
    fn zero(month: YearMonth) -> Self {
        Self {
            month,
            inflow: 0.0,
            outflow: 0.0,
        }
    }

    pub fn net(&self) -> f64 {
        self.inflow - self.outflow
    }
}

/// Money in/out per month, one row for each month that has dated records, ascending.
pub fn monthly_breakdown(txns: &[Transaction]) -> Vec<MonthlyRow> {
    let mut months: BTreeMap<YearMonth, MonthlyRow> = BTreeMap::new();
    for t in txns {
        let Some(date) = t.date else { continue };
        let ym = YearMonth::of(date);
        let row = months.entry(ym).or_insert_with(|| MonthlyRow::zero(ym));
        let Some(amount) = t.amount else { continue };
        match t.direction {
            Direction::Inflow => row.inflow += amount,
            Direction::Outflow => row.outflow += amount,
            Direction::Unknown => {}
        }
    }
    months.into_values().collect()
}

/// Lay `rows` out in `order`, with zero rows for months that have no data.
/// Months in `rows` but not in `order` are dropped.
pub fn fill_months(rows: &[MonthlyRow], order: &[YearMonth]) -> Vec<MonthlyRow> {
    order
        .iter()
        .map(|ym| {
            rows.iter()
                .find(|r| r.month == *ym)
                .cloned()
                .unwrap_or_else(|| MonthlyRow::zero(*ym))
        })
        .collect()
}

/// Totals per category for one direction, largest first.
pub fn category_breakdown(txns: &[Transaction], direction: Direction) -> Vec<(String, f64)> {
    let mut by_cat: BTreeMap<String, f64> = BTreeMap::new();
    for t in txns.iter().filter(|t| t.direction == direction) {
        let Some(amount) = t.amount else { continue };
        *by_cat.entry(t.category.trim().to_string()).or_insert(0.0) += amount;
    }
    let mut out: Vec<(String, f64)> = by_cat.into_iter().collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// The `n` most recent records, newest first; undated records last.
pub fn recent(txns: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = txns.iter().collect();
    // Stable sort keeps later entries of the same day ahead after the reverse.
    sorted.reverse();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

/// Headline figures for a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub surplus: f64,
    pub total_saved: f64,
    pub transaction_fees: f64,
    pub opening_balance: f64,
    pub net_worth: f64,
    pub record_count: usize,
    pub unknown_count: usize,
    /// Records whose amount could not be read as a number.
    pub invalid_amounts: usize,
}

impl Summary {
    pub fn compute(txns: &[Transaction], opening_balance: f64) -> Self {
        let total_inflow = total(txns, Direction::Inflow);
        let total_outflow = total(txns, Direction::Outflow);
        let fees = fees_total(txns);
        Self {
            total_inflow,
            total_outflow,
            surplus: total_inflow - total_outflow,
            total_saved: savings_total(txns),
            transaction_fees: fees,
            opening_balance,
            net_worth: opening_balance + total_inflow - total_outflow - fees,
            record_count: txns.len(),
            unknown_count: txns.iter().filter(|t| !t.direction.is_known()).count(),
            invalid_amounts: txns.iter().filter(|t| t.amount.is_none()).count(),
        }
    }
}
