//! Canonical column names and the legacy-name mapping.

pub const DATE: &str = "date";
pub const WEEK: &str = "week";
pub const AMOUNT: &str = "amount(kes)";
pub const FEES: &str = "transaction fees";
pub const TRANSACTION_TYPE: &str = "transaction type";
pub const CATEGORY: &str = "category";
pub const SUBCATEGORY: &str = "subcategory";
pub const PAYMENT_METHOD: &str = "payment method";
pub const MONEY_IN: &str = wet_core::classify::MONEY_IN_FIELD;
pub const MONEY_OUT: &str = wet_core::classify::MONEY_OUT_FIELD;

/// Spaced variant of [`AMOUNT`] found in some older files.
pub const AMOUNT_SPACED: &str = "amount (kes)";

/// Legacy header → canonical name. Anything not listed passes through.
pub const STANDARD_COLUMNS: &[(&str, &str)] = &[
    ("Transaction Name", "transaction name"),
    ("Date", DATE),
    ("Amount(Kes)", AMOUNT),
    ("Category", CATEGORY),
    ("Sub Category", SUBCATEGORY),
    ("Status", "status"),
    ("Transaction Type", TRANSACTION_TYPE),
    ("Transaction Fees", FEES),
    (MONEY_IN, MONEY_IN),
    (MONEY_OUT, MONEY_OUT),
    ("Payment Method", PAYMENT_METHOD),
];

/// Value type of a canonical column; decides its default and coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Number,
    Text,
}

/// Columns every normalized table carries, in export order.
pub const REQUIRED: &[(&str, ColumnKind)] = &[
    (DATE, ColumnKind::Date),
    (WEEK, ColumnKind::Number),
    (AMOUNT, ColumnKind::Number),
    (FEES, ColumnKind::Number),
    (TRANSACTION_TYPE, ColumnKind::Text),
    (CATEGORY, ColumnKind::Text),
    (SUBCATEGORY, ColumnKind::Text),
    (PAYMENT_METHOD, ColumnKind::Text),
    (MONEY_IN, ColumnKind::Text),
    (MONEY_OUT, ColumnKind::Text),
];

pub fn canonical_name(name: &str) -> &str {
    STANDARD_COLUMNS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Export header order.
pub fn export_columns() -> impl Iterator<Item = &'static str> {
    REQUIRED.iter().map(|(n, _)| *n)
}
