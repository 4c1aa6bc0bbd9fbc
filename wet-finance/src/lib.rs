//! wet-finance: session state with its persistence boundary, CSV export and reports

pub mod export;
pub mod report;
pub mod session;

pub use export::{export_csv, export_to_path, export_transactions};
pub use report::{BudgetReport, CategoryShare, Report, cashflow, fmt_money};
pub use session::{DataFiles, Session, load_budgets, load_categories};
