//! Direction classifier.
//!
//! A record is money in when its money-in description is filled, money out
//! when only its money-out description is filled, and unknown otherwise.

use crate::transaction::{Direction, Transaction};

pub const MONEY_IN_FIELD: &str = "item description (money in)";
pub const MONEY_OUT_FIELD: &str = "item description (money out)";

/// Classify from the two description values.
pub fn classify_descriptions(money_in: Option<&str>, money_out: Option<&str>) -> Direction {
    let filled = |s: Option<&str>| s.is_some_and(|s| !s.trim().is_empty());
    if filled(money_in) {
        Direction::Inflow
    } else if filled(money_out) {
        Direction::Outflow
    } else {
        Direction::Unknown
    }
}

pub fn classify(txn: &Transaction) -> Direction {
    classify_descriptions(Some(&txn.description_in), Some(&txn.description_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_in_wins() {
        assert_eq!(classify_descriptions(Some("Salary"), None), Direction::Inflow);
        assert_eq!(classify_descriptions(Some("Salary"), Some("Rent")), Direction::Inflow);
        assert_eq!(classify_descriptions(Some("  "), Some("Rent")), Direction::Outflow);
    }

    #[test]
    fn test_blank_is_unknown() {
        assert_eq!(classify_descriptions(None, None), Direction::Unknown);
        assert_eq!(classify_descriptions(Some(""), Some(" \t")), Direction::Unknown);
    }
}
