//! Lot type: one recorded acquisition of a held position.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// A lot records an acquisition: units held, the per-unit cost basis they
/// were acquired at, and the acquisition date.
///
/// Lots are held per account and per commodity in insertion order; a `{ }`
/// reduction consumes an entire bucket of them at the stored basis.
///
/// # Examples
///
/// ```
/// use beanbook_core::{Amount, Lot};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let lot = Lot::new(
///     Amount::new(dec!(10), "GOOG"),
///     Amount::new(dec!(150.00), "USD"),
///     date,
/// );
/// assert_eq!(lot.book_value().number, dec!(1500.00));
/// assert_eq!(lot.book_value().currency, "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    /// Units held (e.g., 10 GOOG)
    pub units: Amount,
    /// Per-unit cost basis (e.g., 150.00 USD)
    pub cost: Amount,
    /// Acquisition date
    pub date: NaiveDate,
}

impl Lot {
    /// Create a new lot.
    #[must_use]
    pub const fn new(units: Amount, cost: Amount, date: NaiveDate) -> Self {
        Self { units, cost, date }
    }

    /// Total book value of this lot in the cost currency.
    #[must_use]
    pub fn book_value(&self) -> Amount {
        Amount::new(self.units.number * self.cost.number, self.cost.currency.clone())
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}, {}}}", self.units, self.cost, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_book_value() {
        let lot = Lot::new(
            Amount::new(dec!(10), "GOOG"),
            Amount::new(dec!(500.00), "USD"),
            date(2024, 1, 15),
        );
        assert_eq!(lot.book_value(), Amount::new(dec!(5000.00), "USD"));
    }

    #[test]
    fn test_display() {
        let lot = Lot::new(
            Amount::new(dec!(2), "FOO"),
            Amount::new(dec!(1.50), "USD"),
            date(2024, 3, 1),
        );
        assert_eq!(format!("{lot}"), "2 FOO {1.50 USD, 2024-03-01}");
    }
}
