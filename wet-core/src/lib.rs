//! wet-core: domain types, classifier and aggregation for the Weekly Expense Tracker

pub mod aggregate;
pub mod budget;
pub mod classify;
pub mod error;
pub mod taxonomy;
pub mod time;
pub mod transaction;

pub use aggregate::{MonthlyRow, Summary, YearMonth};
pub use budget::{Advice, BudgetItem, BudgetPeriod, BudgetProgress, BudgetStore, PeriodKey};
pub use classify::classify;
pub use error::{Error, Result};
pub use taxonomy::CategoryTaxonomy;
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction::{Direction, NewTransaction, Transaction, ValidationError};
