//! Budget periods and allocation tracking.
//!
//! Budgets are keyed by a weekly period label like "March 2025 - Week 10".
//! A period is created with a zero ceiling and no items the first time it is
//! touched and is never removed automatically.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::time::{Clock, month_from_name, month_name};
use crate::transaction::ValidationError;

/// Categories counted as fixed commitments when splitting allocations.
pub const DEFAULT_FIXED_CATEGORIES: [&str; 5] = [
    "Housing & Rent",
    "Utilities",
    "Health",
    "Savings & Investment",
    "Debt Repayment",
];

/// Label of one budgeting period (month + year + ISO week).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    month: u32,
    year: i32,
    week: u32,
}

impl PeriodKey {
    pub fn new(month: u32, year: i32, week: u32) -> Result<Self> {
        if month_name(month).is_none() {
            return Err(Error::InvalidPeriod(format!("month {month} out of range")));
        }
        if !(1..=53).contains(&week) {
            return Err(Error::InvalidPeriod(format!("week {week} out of range")));
        }
        Ok(Self { month, year, week })
    }

    /// Period containing today.
    pub fn current(clock: &dyn Clock) -> Self {
        Self {
            month: clock.current_month(),
            year: clock.current_year(),
            week: clock.current_week(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = month_name(self.month).unwrap_or("?");
        write!(f, "{} {} - Week {}", month, self.year, self.week)
    }
}

impl FromStr for PeriodKey {
    type Err = Error;

    /// Parse "March 2025 - Week 10".
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidPeriod(s.to_string());
        let (left, right) = s.split_once('-').ok_or_else(bad)?;
        let mut parts = left.split_whitespace();
        let month = parts.next().and_then(month_from_name).ok_or_else(bad)?;
        let year: i32 = parts.next().and_then(|y| y.parse().ok()).ok_or_else(bad)?;
        if parts.next().is_some() {
            return Err(bad());
        }
        let week: u32 = right
            .trim()
            .strip_prefix("Week")
            .and_then(|w| w.trim().parse().ok())
            .ok_or_else(bad)?;
        Self::new(month, year, week)
    }
}

/// One budgeted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(alias = "amount (kes)", alias = "amount(kes)", default)]
    pub amount: f64,
}

impl BudgetItem {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetPeriod {
    #[serde(default)]
    pub overall_budget: f64,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
}

impl BudgetPeriod {
    pub fn set_overall(&mut self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::NegativeOrInvalid {
                field: "overall budget",
                value: amount,
            }
            .into());
        }
        self.overall_budget = amount;
        Ok(())
    }

    pub fn add_item(&mut self, item: BudgetItem) {
        self.items.push(item);
    }

    pub fn edit_item(&mut self, index: usize, item: BudgetItem) -> Result<()> {
        let len = self.items.len();
        let slot = self.items.get_mut(index).ok_or(Error::NoSuchItem { index, len })?;
        *slot = item;
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<BudgetItem> {
        if index >= self.items.len() {
            return Err(Error::NoSuchItem {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    pub fn total_budgeted(&self) -> f64 {
        self.items.iter().map(|i| i.amount).fold(0.0, |a, b| a + b)
    }

    pub fn fixed_budgeted(&self, fixed: &[String]) -> f64 {
        self.items
            .iter()
            .filter(|i| fixed.contains(&i.category))
            .map(|i| i.amount)
            .fold(0.0, |a, b| a + b)
    }

    pub fn variable_budgeted(&self, fixed: &[String]) -> f64 {
        self.total_budgeted() - self.fixed_budgeted(fixed)
    }

    pub fn progress(&self, fixed: &[String]) -> BudgetProgress {
        let total = self.total_budgeted();
        let fixed_amount = self.fixed_budgeted(fixed);
        let variable = self.variable_budgeted(fixed);
        let overall = self.overall_budget;
        let ratio = |x: f64| if overall > 0.0 { x / overall } else { 0.0 };

        let total_ratio = ratio(total);
        let advice = if total_ratio < 0.7 {
            Advice::UnderAllocated
        } else if total_ratio > 1.0 {
            Advice::OverAllocated
        } else {
            Advice::WithinLimit
        };

        BudgetProgress {
            overall,
            total,
            fixed: fixed_amount,
            variable,
            total_ratio,
            fixed_ratio: ratio(fixed_amount),
            variable_ratio: ratio(variable),
            advice,
            fixed_heavy: fixed_amount > 0.6 * overall,
        }
    }
}

/// How the allocation compares to the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Less than 70% allocated.
    UnderAllocated,
    /// More than 100% allocated.
    OverAllocated,
    WithinLimit,
}

impl Advice {
    pub fn message(&self) -> &'static str {
        match self {
            Advice::UnderAllocated => {
                "You're allocating less than 70% of your budget. Consider increasing savings or investments."
            }
            Advice::OverAllocated => "You've allocated more than 100% of your budget! Review your expenses.",
            Advice::WithinLimit => "Good job! Your budget allocation is within your weekly limit.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub overall: f64,
    pub total: f64,
    pub fixed: f64,
    pub variable: f64,
    /// Allocations as a fraction of `overall`; 0 when no ceiling is set.
    pub total_ratio: f64,
    pub fixed_ratio: f64,
    pub variable_ratio: f64,
    pub advice: Advice,
    /// Fixed allocations exceed 60% of the ceiling.
    pub fixed_heavy: bool,
}

/// All budget periods, keyed by period label.
///
/// Periods that fail to parse are kept aside as raw JSON and written back
/// unchanged, so one bad entry never costs the others.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetStore {
    periods: BTreeMap<String, BudgetPeriod>,
    unreadable: BTreeMap<String, Value>,
}

impl BudgetStore {
    /// Read the `budgets.json` document. Returns the store and one message per
    /// entry that could not be used.
    pub fn from_value(value: Value) -> (Self, Vec<String>) {
        let mut store = Self::default();
        let mut problems = Vec::new();
        match value {
            Value::Object(map) => {
                for (label, raw) in map {
                    match BudgetPeriod::deserialize(&raw) {
                        Ok(period) => {
                            store.periods.insert(label, period);
                        }
                        Err(e) => {
                            warn!("budget period '{label}' is unreadable: {e}");
                            problems.push(format!("budget period '{label}' skipped: {e}"));
                            store.unreadable.insert(label, raw);
                        }
                    }
                }
            }
            Value::Array(items) if items.is_empty() => {}
            other => {
                warn!("budget file is not an object of periods");
                problems.push(format!("expected an object of budget periods, found {other}"));
            }
        }
        (store, problems)
    }

    pub fn to_value(&self) -> Value {
        let mut doc: Map<String, Value> = self.unreadable.clone().into_iter().collect();
        for (label, period) in &self.periods {
            doc.insert(label.clone(), serde_json::to_value(period).unwrap_or(Value::Null));
        }
        Value::Object(doc)
    }

    pub fn get(&self, key: &PeriodKey) -> Option<&BudgetPeriod> {
        self.periods.get(&key.to_string())
    }

    /// The period for `key`, created empty on first access. An unreadable
    /// entry under the same label is replaced.
    pub fn period_mut(&mut self, key: &PeriodKey) -> &mut BudgetPeriod {
        let label = key.to_string();
        self.unreadable.remove(&label);
        self.periods.entry(label).or_default()
    }

    /// Period labels in storage order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixed() -> Vec<String> {
        DEFAULT_FIXED_CATEGORIES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_period_key_roundtrip() {
        let key: PeriodKey = "March 2025 - Week 10".parse().unwrap();
        assert_eq!(key, PeriodKey::new(3, 2025, 10).unwrap());
        assert_eq!(key.to_string(), "March 2025 - Week 10");
        assert!("March 2025 - Week 54".parse::<PeriodKey>().is_err());
        assert!("Smarch 2025 - Week 1".parse::<PeriodKey>().is_err());
        assert!("March 2025".parse::<PeriodKey>().is_err());
    }

    #[test]
    fn test_period_key_from_clock() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(PeriodKey::current(&clock).to_string(), "March 2025 - Week 10");
    }

    #[test]
    fn test_first_access_creates_empty_period() {
        let mut store = BudgetStore::default();
        let key: PeriodKey = "March 2025 - Week 10".parse().unwrap();
        assert!(store.get(&key).is_none());

        let period = store.period_mut(&key);
        assert_eq!(period, &BudgetPeriod::default());
        assert_eq!(period.overall_budget, 0.0);
        assert!(period.total_budgeted().is_sign_positive());

        period.add_item(BudgetItem::new("Transport", "Fuel", 500.0));
        assert_eq!(store.get(&key).unwrap().total_budgeted(), 500.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_edit_remove_clear() {
        let mut p = BudgetPeriod::default();
        p.add_item(BudgetItem::new("Utilities", "Water", 200.0));
        p.add_item(BudgetItem::new("Shopping", "plants", 100.0));

        p.edit_item(1, BudgetItem::new("Shopping", "plants", 150.0)).unwrap();
        assert_eq!(p.total_budgeted(), 350.0);
        assert!(matches!(p.edit_item(5, BudgetItem::new("x", "y", 1.0)), Err(Error::NoSuchItem { index: 5, len: 2 })));

        let removed = p.remove_item(0).unwrap();
        assert_eq!(removed.subcategory, "Water");
        p.clear_items();
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_progress_and_advice() {
        let mut p = BudgetPeriod::default();
        p.set_overall(1000.0).unwrap();
        p.add_item(BudgetItem::new("Housing & Rent", "Rent", 700.0));
        p.add_item(BudgetItem::new("Shopping", "plants", 100.0));

        let prog = p.progress(&fixed());
        assert_eq!(prog.fixed, 700.0);
        assert_eq!(prog.variable, 100.0);
        assert_eq!(prog.advice, Advice::WithinLimit);
        assert!(prog.fixed_heavy);

        p.add_item(BudgetItem::new("Shopping", "electronics", 500.0));
        assert_eq!(p.progress(&fixed()).advice, Advice::OverAllocated);

        let empty = BudgetPeriod::default().progress(&fixed());
        assert_eq!(empty.total_ratio, 0.0);
        assert_eq!(empty.advice, Advice::UnderAllocated);
        assert!(matches!(
            p.set_overall(-5.0),
            Err(Error::Validation(ValidationError::NegativeOrInvalid { field: "overall budget", .. }))
        ));
        assert_eq!(p.overall_budget, 1000.0);
    }

    #[test]
    fn test_store_accepts_legacy_amount_keys() {
        let (store, problems) = BudgetStore::from_value(json!({
            "March 2025 - Week 10": {
                "overall_budget": 5000,
                "items": [
                    {"category": "Transport", "subcategory": "Fuel", "amount (kes)": 800},
                    {"category": "Utilities", "subcategory": "Water", "amount": 200}
                ]
            }
        }));
        let key: PeriodKey = "March 2025 - Week 10".parse().unwrap();
        assert!(problems.is_empty());
        let p = store.get(&key).unwrap();
        assert_eq!(p.overall_budget, 5000.0);
        assert_eq!(p.total_budgeted(), 1000.0);

        let out = store.to_value();
        assert_eq!(out["March 2025 - Week 10"]["items"][0]["amount"], 800.0);
    }

    #[test]
    fn test_store_from_wrong_shape() {
        let (store, problems) = BudgetStore::from_value(json!([]));
        assert!(store.is_empty());
        assert!(problems.is_empty());

        let (store, problems) = BudgetStore::from_value(json!("budgets"));
        assert!(store.is_empty());
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn test_bad_period_is_skipped_and_kept() {
        let (mut store, problems) = BudgetStore::from_value(json!({
            "February 2025 - Week 6": {"overall_budget": 3000, "items": []},
            "February 2025 - Week 9": {
                "overall_budget": 1000,
                "items": [{"category": "Transport", "amount (kes)": null}]
            }
        }));
        assert_eq!(store.len(), 1);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("February 2025 - Week 9"));

        let week10: PeriodKey = "March 2025 - Week 10".parse().unwrap();
        store.period_mut(&week10).add_item(BudgetItem::new("Utilities", "Water", 200.0));
        let out = store.to_value();
        assert_eq!(out["February 2025 - Week 6"]["overall_budget"], 3000.0);
        assert!(out["February 2025 - Week 9"]["items"][0]["amount (kes)"].is_null());
        assert_eq!(out["March 2025 - Week 10"]["items"][0]["amount"], 200.0);

        // Editing the unreadable period replaces it.
        let week9: PeriodKey = "February 2025 - Week 9".parse().unwrap();
        store.period_mut(&week9).set_overall(500.0).unwrap();
        assert_eq!(store.to_value()["February 2025 - Week 9"]["overall_budget"], 500.0);
    }
}
