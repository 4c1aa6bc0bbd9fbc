//! Transaction record types: the canonical record, its direction, and entry validation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::classify::classify;

/// Payment methods offered when entering a transaction.
pub const PAYMENT_METHODS: [&str; 6] = [
    "Cash",
    "M-Pesa",
    "Bank Transfer",
    "Credit Card",
    "Debit Card",
    "Other",
];

/// Payment method recorded for money received.
pub const NOT_APPLICABLE_METHOD: &str = "N/A";

/// Subcategory recorded for money received when none is given.
pub const NOT_APPLICABLE_SUBCATEGORY: &str = "Not applicable";

/// Whether money came in, went out, or the record doesn't say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inflow,
    Outflow,
    Unknown,
}

impl Direction {
    /// Label stored in the `transaction type` column for new records.
    pub fn type_label(&self) -> &'static str {
        match self {
            Direction::Inflow => "debit",
            Direction::Outflow => "credit",
            Direction::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Inflow => "Money In",
            Direction::Outflow => "Money Out",
            Direction::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

static INFLOW_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(debit|money\s*in|in|inflow|income)\b").unwrap());
static OUTFLOW_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(credit|money\s*out|out|outflow|expense)\b").unwrap());

impl FromStr for Direction {
    type Err = ValidationError;

    /// Parse a free-text type label ("Money in (debit)", "credit", "out", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if INFLOW_LABEL.is_match(s) {
            Ok(Direction::Inflow)
        } else if OUTFLOW_LABEL.is_match(s) {
            Ok(Direction::Outflow)
        } else {
            Err(ValidationError::UnknownDirection(s.trim().to_string()))
        }
    }
}

/// A transaction in canonical form.
///
/// `None` in `date` is the missing-date sentinel; `None` in `amount` or
/// `transaction_fees` marks a value that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    #[serde(serialize_with = "ser_date")]
    pub date: Option<NaiveDate>,
    pub week: Option<u32>,
    #[serde(rename = "amount(kes)")]
    pub amount: Option<f64>,
    #[serde(rename = "transaction fees")]
    pub transaction_fees: Option<f64>,
    /// Free-text type label as found in the source record.
    #[serde(rename = "transaction type")]
    pub transaction_type: String,
    pub category: String,
    pub subcategory: String,
    #[serde(rename = "payment method")]
    pub payment_method: String,
    #[serde(rename = "item description (money in)")]
    pub description_in: String,
    #[serde(rename = "item description (money out)")]
    pub description_out: String,
    /// Set by the classifier; never stored.
    #[serde(skip)]
    pub direction: Direction,
}

fn ser_date<S: serde::Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
        None => s.serialize_none(),
    }
}

impl Transaction {
    /// Re-derive `direction` from the description fields.
    pub fn classified(mut self) -> Self {
        self.direction = classify(&self);
        self
    }

    /// ISO week of `date`, if there is one.
    pub fn iso_week(&self) -> Option<u32> {
        self.date.map(|d| d.iso_week().week())
    }

    /// The description matching this record's direction.
    pub fn description(&self) -> &str {
        match self.direction {
            Direction::Inflow => &self.description_in,
            Direction::Outflow => &self.description_out,
            Direction::Unknown => "",
        }
    }

    /// Canonical JSON object, as written to the transaction store.
    pub fn to_record(&self) -> serde_json::Value {
        // Serialize on a plain struct of strings/numbers cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Problems with a transaction entered by the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unrecognized transaction type '{0}' (use money in/debit or money out/credit)")]
    UnknownDirection(String),

    #[error("{field} must be a non-negative number, got {value}")]
    NegativeOrInvalid { field: &'static str, value: f64 },

    #[error("Please select a category.")]
    MissingCategory,

    #[error("Please select a subcategory.")]
    MissingSubcategory,

    #[error("Please select a payment method.")]
    MissingPaymentMethod,

    #[error("unknown payment method '{0}'")]
    UnknownPaymentMethod(String),

    #[error("Please enter an item description.")]
    MissingDescription,
}

/// User-entered values for a new transaction, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub direction: Direction,
    pub date: NaiveDate,
    pub amount: f64,
    pub fees: f64,
    pub category: String,
    pub subcategory: Option<String>,
    pub payment_method: Option<String>,
    pub description: String,
}

impl NewTransaction {
    pub fn new(direction: Direction, date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self {
            direction,
            date,
            amount,
            fees: 0.0,
            category: category.into(),
            subcategory: None,
            payment_method: None,
            description: String::new(),
        }
    }

    pub fn with_fees(mut self, fees: f64) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check the entry and build the canonical record.
    pub fn validate(self) -> Result<Transaction, ValidationError> {
        let inflow = match self.direction {
            Direction::Inflow => true,
            Direction::Outflow => false,
            Direction::Unknown => return Err(ValidationError::UnknownDirection("unknown".into())),
        };

        for (field, value) in [("amount", self.amount), ("transaction fees", self.fees)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::NegativeOrInvalid { field, value });
            }
        }

        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        let subcategory = match self.subcategory.map(|s| s.trim().to_string()) {
            Some(s) if !s.is_empty() => s,
            _ if inflow => NOT_APPLICABLE_SUBCATEGORY.to_string(),
            _ => return Err(ValidationError::MissingSubcategory),
        };

        let payment_method = match self.payment_method.as_deref().map(str::trim) {
            None | Some("") if inflow => NOT_APPLICABLE_METHOD.to_string(),
            None | Some("") => return Err(ValidationError::MissingPaymentMethod),
            Some(m) if inflow && m.eq_ignore_ascii_case(NOT_APPLICABLE_METHOD) => {
                NOT_APPLICABLE_METHOD.to_string()
            }
            Some(m) => PAYMENT_METHODS
                .iter()
                .find(|p| p.eq_ignore_ascii_case(m))
                .map(|p| p.to_string())
                .ok_or_else(|| ValidationError::UnknownPaymentMethod(m.to_string()))?,
        };

        // Direction is re-derived from the description on every load.
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let (description_in, description_out) = if inflow {
            (description, String::new())
        } else {
            (String::new(), description)
        };

        let txn = Transaction {
            date: Some(self.date),
            week: Some(self.date.iso_week().week()),
            amount: Some(self.amount),
            transaction_fees: Some(self.fees),
            transaction_type: self.direction.type_label().to_string(),
            category,
            subcategory,
            payment_method,
            description_in,
            description_out,
            direction: self.direction,
        };
        Ok(txn)
    }
}
