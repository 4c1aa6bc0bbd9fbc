//! Report assembly: everything the presentation layer shows, computed in one place.

use serde::Serialize;
use wet_core::aggregate::{self, calendar_year, category_breakdown, fill_months, monthly_breakdown};
use wet_core::{BudgetPeriod, BudgetProgress, Direction, MonthlyRow, PeriodKey, Summary, Transaction};

/// One slice of a category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    /// Fraction of the direction's total (0 when that total is 0).
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub expenses: Vec<CategoryShare>,
    pub income: Vec<CategoryShare>,
    pub monthly: Vec<MonthlyRow>,
}

impl Report {
    pub fn build(txns: &[Transaction], opening_balance: f64) -> Self {
        Self {
            summary: Summary::compute(txns, opening_balance),
            expenses: shares(txns, Direction::Outflow),
            income: shares(txns, Direction::Inflow),
            monthly: monthly_breakdown(txns),
        }
    }
}

fn shares(txns: &[Transaction], direction: Direction) -> Vec<CategoryShare> {
    let total = aggregate::total(txns, direction);
    category_breakdown(txns, direction)
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            total: amount,
            share: if total > 0.0 { amount / total } else { 0.0 },
        })
        .collect()
}

/// Monthly cashflow; with `year`, all twelve months of that year in calendar order.
pub fn cashflow(txns: &[Transaction], year: Option<i32>) -> Vec<MonthlyRow> {
    let rows = monthly_breakdown(txns);
    match year {
        Some(y) => fill_months(&rows, &calendar_year(y)),
        None => rows,
    }
}

/// A budget period with its computed progress.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReport<'a> {
    pub key: &'a PeriodKey,
    pub period: &'a BudgetPeriod,
    pub progress: BudgetProgress,
}

impl<'a> BudgetReport<'a> {
    pub fn new(key: &'a PeriodKey, period: &'a BudgetPeriod, fixed: &[String]) -> Self {
        Self {
            key,
            period,
            progress: period.progress(fixed),
        }
    }
}

/// Format an amount with thousands separators and two decimals: `1,234.50`.
pub fn fmt_money(amount: f64) -> String {
    let s = format!("{:.2}", amount.abs());
    let (int, frac) = s.split_once('.').unwrap_or((&s, "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && s != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wet_core::{BudgetItem, NewTransaction};

    fn sample() -> Vec<Transaction> {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        vec![
            NewTransaction::new(Direction::Inflow, d(3, 4), 1000.0, "Salary")
                .with_description("Salary")
                .validate()
                .unwrap(),
            NewTransaction::new(Direction::Outflow, d(3, 9), 300.0, "Food & Beverages")
                .with_subcategory("Market")
                .with_payment_method("Cash")
                .with_description("Veg")
                .validate()
                .unwrap(),
            NewTransaction::new(Direction::Outflow, d(5, 1), 100.0, "Transport")
                .with_subcategory("Fuel")
                .with_payment_method("M-Pesa")
                .with_fees(7.0)
                .with_description("Fuel")
                .validate()
                .unwrap(),
        ]
    }

    #[test]
    fn test_report_build() {
        let r = Report::build(&sample(), 500.0);
        assert_eq!(r.summary.total_inflow, 1000.0);
        assert_eq!(r.summary.total_outflow, 400.0);
        assert_eq!(r.summary.net_worth, 500.0 + 1000.0 - 400.0 - 7.0);
        assert_eq!(r.expenses[0].category, "Food & Beverages");
        assert_eq!(r.expenses[0].share, 0.75);
        assert_eq!(r.income.len(), 1);
        assert_eq!(r.monthly.len(), 2);
    }

    #[test]
    fn test_cashflow_full_year() {
        let rows = cashflow(&sample(), Some(2024));
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[3].inflow + rows[3].outflow, 0.0);
        assert_eq!(rows[4].outflow, 100.0);
        assert_eq!(cashflow(&sample(), None).len(), 2);
    }

    #[test]
    fn test_budget_report() {
        let key: PeriodKey = "March 2025 - Week 10".parse().unwrap();
        let mut period = BudgetPeriod::default();
        period.set_overall(1000.0).unwrap();
        period.add_item(BudgetItem::new("Utilities", "Water", 500.0));
        let fixed = vec!["Utilities".to_string()];
        let r = BudgetReport::new(&key, &period, &fixed);
        assert_eq!(r.progress.fixed_ratio, 0.5);
        assert_eq!(r.progress.total, 500.0);
    }

    #[test]
    fn test_fmt_money() {
        assert_eq!(fmt_money(0.0), "0.00");
        assert_eq!(fmt_money(999.5), "999.50");
        assert_eq!(fmt_money(1234.5), "1,234.50");
        assert_eq!(fmt_money(1234567.891), "1,234,567.89");
        assert_eq!(fmt_money(-2500.0), "-2,500.00");
    }
}
