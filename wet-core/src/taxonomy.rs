//! Category taxonomy: expense categories with their subcategories, plus income categories.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

/// Key under which income categories live in `categories.json`.
pub const INCOME_KEY: &str = "income_categories";

const DEFAULT_EXPENSE: &[(&str, &[&str])] = &[
    ("Food & Beverages", &["Supermarket", "Market", "Take-out"]),
    ("Transport", &["Fuel", "Public Transport", "Cab/taxi", "Parking", "transit fee"]),
    ("Housing & Rent", &["Rent", "Maintenance", "Cleaning"]),
    ("Shopping", &["electronics", "furniture & decor", "household items", "plants"]),
    ("Utilities", &["Electricity", "Water", "Internet", "Airtime"]),
    ("Health", &["Hospital", "Medicine", "Insurance"]),
    ("Education", &["School fees", "Books", "Tuition"]),
    ("Entertainment", &["Netflix", "Outings", "Events"]),
    ("Personal Care", &["Salon", "Toiletries", "Apparel"]),
    ("Savings & Investment", &["Mshwari", "Sacco", "Chama", "MMF"]),
    ("Debt Repayment", &["Loan", "Fuliza", "loan expenses"]),
    ("Lent out", &["private loans", "interest"]),
    ("Gifts & Donations", &["Charity", "Family Support"]),
    ("Miscellaneous", &["Other", "Transaction charges"]),
];

const DEFAULT_INCOME: &[&str] = &[
    "Bonus",
    "Debtors",
    "Dividends",
    "Honorarium",
    "Loan",
    "Reimbursement",
    "Salary",
    "Savings",
    "Scholarship Fund",
    "Stipend",
    "Windfall",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTaxonomy {
    expense: BTreeMap<String, Vec<String>>,
    income: Vec<String>,
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self {
            expense: DEFAULT_EXPENSE
                .iter()
                .map(|(cat, subs)| (cat.to_string(), subs.iter().map(|s| s.to_string()).collect()))
                .collect(),
            income: DEFAULT_INCOME.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CategoryTaxonomy {
    pub fn empty() -> Self {
        Self {
            expense: BTreeMap::new(),
            income: Vec::new(),
        }
    }

    /// Read the `categories.json` document.
    ///
    /// Accepts an object (categories → subcategory lists, plus an optional
    /// `income_categories` list) or a list of such objects, which are merged.
    /// Returns `None` for any other shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let merged: Map<String, Value> = match value {
            Value::Object(map) => map.clone(),
            Value::Array(items) => {
                warn!("categories file is a list, merging its objects");
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .flat_map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())))
                    .collect()
            }
            _ => return None,
        };

        let mut taxonomy = Self::empty();
        let mut saw_income = false;
        for (key, val) in merged {
            if key == INCOME_KEY {
                saw_income = true;
                taxonomy.income = string_list(&val);
            } else {
                taxonomy.expense.insert(key, string_list(&val));
            }
        }
        if !saw_income {
            taxonomy.income = DEFAULT_INCOME.iter().map(|s| s.to_string()).collect();
        }
        Some(taxonomy)
    }

    /// The expense mapping alone, as the default file is written.
    pub fn expense_value(&self) -> Value {
        Value::Object(
            self.expense
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        )
    }

    /// Full document: expense mapping plus `income_categories`.
    pub fn to_value(&self) -> Value {
        let mut doc = self.expense_value();
        if let Value::Object(map) = &mut doc {
            map.insert(INCOME_KEY.to_string(), Value::from(self.income.clone()));
        }
        doc
    }

    /// Expense category names, sorted.
    pub fn main_categories(&self) -> Vec<&str> {
        self.expense.keys().map(String::as_str).collect()
    }

    pub fn subcategories_for(&self, category: &str) -> &[String] {
        self.expense.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Which expense category lists this subcategory, if any.
    pub fn category_for_subcategory(&self, subcategory: &str) -> Option<&str> {
        self.expense
            .iter()
            .find(|(_, subs)| subs.iter().any(|s| s == subcategory))
            .map(|(cat, _)| cat.as_str())
    }

    /// Every subcategory across all categories, sorted.
    pub fn all_subcategories(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.expense.values().flatten().map(String::as_str).collect();
        all.sort_unstable();
        all
    }

    /// Income category names, sorted.
    pub fn income_categories(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.income.iter().map(String::as_str).collect();
        all.sort_unstable();
        all
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.expense.contains_key(category)
    }

    /// Returns false if the category already existed.
    pub fn add_category(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if self.expense.contains_key(&category) {
            return false;
        }
        self.expense.insert(category, Vec::new());
        true
    }

    /// Adds the subcategory (creating the category if needed). Returns false on duplicates.
    pub fn add_subcategory(&mut self, category: &str, subcategory: impl Into<String>) -> bool {
        let subcategory = subcategory.into();
        let subs = self.expense.entry(category.to_string()).or_default();
        if subs.contains(&subcategory) {
            return false;
        }
        subs.push(subcategory);
        true
    }

    pub fn add_income_category(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.income.contains(&name) {
            return false;
        }
        self.income.push(name);
        true
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}
