//! The accumulated ledger model.

use beanbook_core::{Amount, Lot, Pad};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// An account's lifecycle and constraints.
///
/// Open intervals are kept as two parallel date vectors: `opened[i]` pairs
/// with `closed[i]`, and a trailing `opened` entry without a match means
/// the account is still open. Both interval endpoints are inclusive, so a
/// same-day open and close leaves the account open for that one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account name
    pub name: String,
    /// Allowed commodities; empty means any commodity is permitted
    pub currencies: HashSet<String>,
    /// Interval start dates, non-decreasing
    pub opened: Vec<NaiveDate>,
    /// Interval end dates, parallel to `opened`
    pub closed: Vec<NaiveDate>,
    /// True once any posting has touched the account
    pub had_transactions: bool,
    /// Pending pad waiting for a balance assertion to consume it
    pub pad: Option<Pad>,
}

impl Account {
    /// Create an account opened on `date` with the given allowed set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        currencies: impl IntoIterator<Item = String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            currencies: currencies.into_iter().collect(),
            opened: vec![date],
            closed: Vec::new(),
            had_transactions: false,
            pad: None,
        }
    }

    /// Check if a commodity can be used in this account.
    #[must_use]
    pub fn currency_allowed(&self, currency: &str) -> bool {
        self.currencies.is_empty() || self.currencies.contains(currency)
    }

    /// Check if the account is open on the given date.
    #[must_use]
    pub fn is_open(&self, date: NaiveDate) -> bool {
        for (i, opened) in self.opened.iter().enumerate() {
            if date >= *opened {
                match self.closed.get(i) {
                    Some(closed) if date <= *closed => return true,
                    Some(_) => {}
                    None => return true,
                }
            }
        }
        false
    }

    /// Check if the account is closed on the given date.
    #[must_use]
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        !self.is_open(date)
    }
}

/// One recorded price observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Price in the quote currency
    pub amount: Amount,
}

/// The evolving ledger state the evaluator applies directives to.
///
/// Inner balance maps omit a commodity until it is first touched; a zero
/// balance after activity is stored explicitly. Price histories are
/// append-only.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// All known accounts by name
    pub accounts: HashMap<String, Account>,
    /// Per-account, per-commodity balances
    pub balances: HashMap<String, HashMap<String, Decimal>>,
    /// Per-account, per-commodity lot inventories, in insertion order
    pub inventories: HashMap<String, HashMap<String, Vec<Lot>>>,
    /// Per-commodity price history, in application order
    pub prices: HashMap<String, Vec<PricePoint>>,
}

impl LedgerState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The balance of one commodity in one account, zero until touched.
    #[must_use]
    pub fn balance(&self, account: &str, currency: &str) -> Decimal {
        self.balances
            .get(account)
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
            .unwrap_or_default()
    }

    /// The lots held for one commodity in one account.
    #[must_use]
    pub fn lots(&self, account: &str, currency: &str) -> &[Lot] {
        self.inventories
            .get(account)
            .and_then(|by_currency| by_currency.get(currency))
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_currency_allowed_empty_set_allows_all() {
        let account = Account::new("Assets:Bank", [], date(2024, 1, 1));
        assert!(account.currency_allowed("USD"));
        assert!(account.currency_allowed("BOTTLE_CAP"));
    }

    #[test]
    fn test_currency_allowed_restricted() {
        let account = Account::new("Assets:Bank", ["USD".to_string()], date(2024, 1, 1));
        assert!(account.currency_allowed("USD"));
        assert!(!account.currency_allowed("EUR"));
    }

    #[test]
    fn test_is_open_unclosed_tail() {
        let account = Account::new("Assets:Bank", [], date(2024, 1, 10));
        assert!(!account.is_open(date(2024, 1, 9)));
        assert!(account.is_open(date(2024, 1, 10)));
        assert!(account.is_open(date(2030, 1, 1)));
    }

    #[test]
    fn test_is_open_interval_endpoints_inclusive() {
        let mut account = Account::new("Assets:Bank", [], date(2024, 1, 10));
        account.closed.push(date(2024, 3, 10));
        assert!(account.is_open(date(2024, 1, 10)));
        assert!(account.is_open(date(2024, 3, 10)));
        assert!(!account.is_open(date(2024, 3, 11)));
    }

    #[test]
    fn test_is_open_same_day_interval() {
        let mut account = Account::new("Assets:Bank", [], date(2024, 1, 10));
        account.closed.push(date(2024, 1, 10));
        assert!(account.is_open(date(2024, 1, 10)));
        assert!(!account.is_open(date(2024, 1, 11)));
    }

    #[test]
    fn test_is_open_multiple_intervals() {
        let mut account = Account::new("Assets:Bank", [], date(2024, 1, 1));
        account.closed.push(date(2024, 2, 1));
        account.opened.push(date(2024, 6, 1));
        assert!(account.is_open(date(2024, 1, 15)));
        assert!(!account.is_open(date(2024, 3, 1)));
        assert!(account.is_open(date(2024, 6, 1)));
    }

    #[test]
    fn test_state_balance_defaults_to_zero() {
        let state = LedgerState::new();
        assert_eq!(state.balance("Assets:Bank", "USD"), Decimal::ZERO);
        assert!(state.lots("Assets:Bank", "GOOG").is_empty());
    }
}
