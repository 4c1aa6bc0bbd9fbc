//! Application state for one run: data files, taxonomy, budgets and transactions.
//!
//! Everything is loaded up front by [`Session::open`], which never fails.
//! Read problems are collected as warnings. Mutations stay in memory until one
//! of the explicit save calls writes them back.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::{debug, info, warn};
use wet_core::budget::DEFAULT_FIXED_CATEGORIES;
use wet_core::{
    BudgetPeriod, BudgetStore, CategoryTaxonomy, Clock, NewTransaction, PeriodKey, Summary,
    Transaction,
};
use wet_ingest::store::{self, Loaded, StoreWarning};
use wet_ingest::{Table, load_transactions, normalize, read_csv_table, to_transactions};

use crate::export;
use crate::report::Report;

pub const CATEGORIES_FILE: &str = "categories.json";
pub const TRANSACTIONS_FILE: &str = "saved_transactions.json";
pub const LEGACY_TRANSACTIONS_FILE: &str = "transactions.json";
pub const BUDGETS_FILE: &str = "budgets.json";
pub const EXPORT_FILE: &str = "transactions_export.csv";

/// Paths of every file the tracker reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub dir: PathBuf,
    pub categories: PathBuf,
    pub transactions: PathBuf,
    pub legacy_transactions: PathBuf,
    pub budgets: PathBuf,
    pub export_csv: PathBuf,
}

impl DataFiles {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            categories: dir.join(CATEGORIES_FILE),
            transactions: dir.join(TRANSACTIONS_FILE),
            legacy_transactions: dir.join(LEGACY_TRANSACTIONS_FILE),
            budgets: dir.join(BUDGETS_FILE),
            export_csv: dir.join(EXPORT_FILE),
            dir,
        }
    }
}

/// Load the category taxonomy.
///
/// A missing or empty file yields the defaults, and the default expense
/// mapping is written back so the user can edit it. An unreadable or
/// oddly-shaped file also yields the defaults but is left untouched.
pub fn load_categories(path: &Path) -> Loaded<CategoryTaxonomy> {
    let Loaded { data, warning } = store::load_value(path);
    if let Some(warning) = warning {
        return Loaded {
            data: CategoryTaxonomy::default(),
            warning: Some(warning),
        };
    }

    let value = match data {
        Some(Value::Array(items)) if items.is_empty() => None,
        other => other,
    };
    let Some(value) = value else {
        let taxonomy = CategoryTaxonomy::default();
        info!("no categories at {}, writing defaults", path.display());
        let warning = store::save_value(path, &taxonomy.expense_value())
            .err()
            .map(|e| write_warning(path, e));
        return Loaded { data: taxonomy, warning };
    };

    match CategoryTaxonomy::from_value(&value) {
        Some(taxonomy) => Loaded {
            data: taxonomy,
            warning: None,
        },
        None => {
            let warning = StoreWarning {
                path: path.to_path_buf(),
                message: "expected an object of categories".to_string(),
            };
            warn!("{warning}");
            Loaded {
                data: CategoryTaxonomy::default(),
                warning: Some(warning),
            }
        }
    }
}

/// Load all budget periods.
///
/// Periods that fail to parse are reported in the warning and kept aside, so
/// a later save writes them back unchanged.
pub fn load_budgets(path: &Path) -> Loaded<BudgetStore> {
    let Loaded { data, warning } = store::load_value(path);
    let Some(value) = data else {
        return Loaded {
            data: BudgetStore::default(),
            warning,
        };
    };
    let (budgets, problems) = BudgetStore::from_value(value);
    let warning = warning.or_else(|| {
        (!problems.is_empty()).then(|| StoreWarning {
            path: path.to_path_buf(),
            message: problems.join("; "),
        })
    });
    Loaded { data: budgets, warning }
}

fn write_warning(path: &Path, err: wet_core::Error) -> StoreWarning {
    let warning = StoreWarning {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    warn!("could not write {}: {err}", path.display());
    warning
}

pub struct Session {
    files: DataFiles,
    taxonomy: CategoryTaxonomy,
    budgets: BudgetStore,
    /// Stored records as read, so unknown columns survive a rewrite.
    records: Vec<Value>,
    transactions: Vec<Transaction>,
    opening_balance: f64,
    current_period: PeriodKey,
    fixed_categories: Vec<String>,
    warnings: Vec<StoreWarning>,
}

impl Session {
    pub fn open(files: DataFiles, clock: &dyn Clock, opening_balance: f64) -> Self {
        let mut warnings = Vec::new();
        let mut keep = |w: Option<StoreWarning>| warnings.extend(w);

        let categories = load_categories(&files.categories);
        keep(categories.warning);
        let budgets = load_budgets(&files.budgets);
        keep(budgets.warning);
        let stored = load_transactions(&files.transactions);
        keep(stored.warning);

        let (records, transactions) = stored.data;
        debug!(
            "session opened on {} with {} transactions, {} budget periods",
            files.dir.display(),
            transactions.len(),
            budgets.data.len()
        );

        Self {
            files,
            taxonomy: categories.data,
            budgets: budgets.data,
            records,
            transactions,
            opening_balance,
            current_period: PeriodKey::current(clock),
            fixed_categories: DEFAULT_FIXED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            warnings,
        }
    }

    pub fn with_fixed_categories(mut self, fixed: Vec<String>) -> Self {
        self.fixed_categories = fixed;
        self
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn taxonomy_mut(&mut self) -> &mut CategoryTaxonomy {
        &mut self.taxonomy
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    pub fn current_period(&self) -> &PeriodKey {
        &self.current_period
    }

    pub fn fixed_categories(&self) -> &[String] {
        &self.fixed_categories
    }

    /// Read problems collected while opening.
    pub fn warnings(&self) -> &[StoreWarning] {
        &self.warnings
    }

    /// Validate and store a new entry.
    ///
    /// A rejected entry changes nothing. When the file write fails the entry
    /// is still kept in memory and the write error is returned.
    pub fn record(&mut self, entry: NewTransaction) -> wet_core::Result<&Transaction> {
        let txn = entry.validate()?;
        self.records.push(txn.to_record());
        self.transactions.push(txn);
        let saved = store::save(&self.files.transactions, &self.records);
        let idx = self.transactions.len() - 1;
        saved.map(|()| &self.transactions[idx])
    }

    /// Append the records of a JSON or CSV file in memory. Returns how many
    /// were added. Call [`Session::save_transactions`] to keep them.
    pub fn import_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let table = if is_csv {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            read_csv_table(file).with_context(|| format!("reading {}", path.display()))?
        } else {
            if !path.exists() {
                bail!("{} does not exist", path.display());
            }
            let Loaded { data, warning } = store::load(path);
            if let Some(w) = warning {
                bail!("{w}");
            }
            Table::from_records(&data)
        };

        let table = normalize(table);
        let added = table.len();
        self.transactions.extend(to_transactions(table.clone()));
        self.records.extend(table.to_records());
        info!("imported {} records from {}", added, path.display());
        Ok(added)
    }

    /// Rewrite the transactions file from memory.
    pub fn save_transactions(&self) -> wet_core::Result<()> {
        store::save(&self.files.transactions, &self.records)
    }

    /// The budget for `key`, if one has been set up.
    pub fn budget(&self, key: &PeriodKey) -> Option<&BudgetPeriod> {
        self.budgets.get(key)
    }

    /// The budget for `key`, created empty on first access.
    pub fn budget_mut(&mut self, key: &PeriodKey) -> &mut BudgetPeriod {
        self.budgets.period_mut(key)
    }

    pub fn budgets(&self) -> &BudgetStore {
        &self.budgets
    }

    pub fn save_budgets(&self) -> wet_core::Result<()> {
        store::save_value(&self.files.budgets, &self.budgets.to_value())
    }

    pub fn save_categories(&self) -> wet_core::Result<()> {
        store::save_value(&self.files.categories, &self.taxonomy.to_value())
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.transactions, self.opening_balance)
    }

    pub fn report(&self) -> Report {
        Report::build(&self.transactions, self.opening_balance)
    }

    /// Write every transaction to `out`, or to the default export file.
    pub fn export(&self, out: Option<&Path>) -> anyhow::Result<(PathBuf, usize)> {
        let path = out.unwrap_or(&self.files.export_csv).to_path_buf();
        let n = export::export_to_path(&self.transactions, &path)?;
        Ok((path, n))
    }
}
