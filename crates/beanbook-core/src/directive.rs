//! Directive types representing all supported ledger directives.
//!
//! The directive set is closed and small:
//!
//! - [`Transaction`] - The most common directive, recording transfers between accounts
//! - [`Balance`] - Assert that an account has a specific balance
//! - [`Open`] - Open an account for use
//! - [`Close`] - Close an account
//! - [`Pad`] - Let the next balance assertion auto-generate a balancing transaction
//! - [`Price`] - Record a price for a commodity
//!
//! Each variant carries a common header: its date and an [`Origin`]
//! (source file and line). Sorting compares only the header, via
//! [`sort_directives`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::Amount;

/// The recognised account roots. Posting lines whose account starts with
/// any other segment are not postings and are silently skipped.
pub const ACCOUNT_ROOTS: [&str; 5] = ["Assets", "Equity", "Income", "Expenses", "Liabilities"];

/// Check whether an account name starts with a recognised root segment.
#[must_use]
pub fn has_recognised_root(account: &str) -> bool {
    let root = account.split(':').next().unwrap_or("");
    ACCOUNT_ROOTS.contains(&root)
}

/// Where a directive came from in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Source file path
    pub file: PathBuf,
    /// 1-based line number of the directive's header line
    pub line: usize,
}

impl Origin {
    /// Create a new origin.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Cost annotation on a posting (`{ ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostSpec {
    /// `{ }` - consume all held lots of the posting commodity at their
    /// stored basis.
    Implicit,
    /// `{ <number> <currency> }` - explicit per-unit cost basis.
    PerUnit(Amount),
}

impl fmt::Display for CostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implicit => write!(f, "{{}}"),
            Self::PerUnit(a) => write!(f, "{{{a}}}"),
        }
    }
}

/// A posting within a transaction.
///
/// Postings are the individual legs of a transaction. Each posting names an
/// account and optionally units, a cost annotation, and a per-unit
/// conversion price. `units == None` marks the balancing (blank) leg whose
/// value is resolved from the other postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The account for this posting
    pub account: String,
    /// The units, or `None` for the balancing leg
    pub units: Option<Amount>,
    /// Cost annotation (`{ }` or `{ n C }`)
    pub cost: Option<CostSpec>,
    /// Per-unit conversion price (`@`, or `@@` already divided down)
    pub price: Option<Amount>,
}

impl Posting {
    /// Create a new posting with the given account and units.
    #[must_use]
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Self {
            account: account.into(),
            units: Some(units),
            cost: None,
            price: None,
        }
    }

    /// Create a blank posting whose value balances the transaction.
    #[must_use]
    pub fn blank(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            units: None,
            cost: None,
            price: None,
        }
    }

    /// Add a cost annotation.
    #[must_use]
    pub fn with_cost(mut self, cost: CostSpec) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Add a per-unit price annotation.
    #[must_use]
    pub fn with_price(mut self, price: Amount) -> Self {
        self.price = Some(price);
        self
    }

    /// Check if this is the balancing leg.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.units.is_none()
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}", self.account)?;
        if let Some(units) = &self.units {
            write!(f, "  {units}")?;
        }
        if let Some(cost) = &self.cost {
            write!(f, " {cost}")?;
        }
        if let Some(price) = &self.price {
            write!(f, " @ {price}")?;
        }
        Ok(())
    }
}

/// Directive ordering priority for same-day tiebreaking.
///
/// When directives share a date they are applied in priority order; the
/// numeric gaps are deliberate so the invariant pad < balance < any
/// same-day transaction holds, with synthetic prices just after balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectivePriority {
    /// Accounts open before anything uses them
    Open = 1,
    /// Closes next
    Close = 2,
    /// Padding runs before the balance assertion it feeds
    Pad = 3,
    /// Balance assertions checked before the day's activity
    Balance = 4,
    /// Prices (including ones synthesised from postings) after balances
    Price = 5,
    /// Transactions at the end of the day's fixed classes
    Transaction = 10_000,
}

/// All directive types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Transaction - records transfers between accounts
    Transaction(Transaction),
    /// Balance assertion - asserts an account balance at a date
    Balance(Balance),
    /// Open account
    Open(Open),
    /// Close account
    Close(Close),
    /// Pad - auto-pad an account to match the next balance assertion
    Pad(Pad),
    /// Price - records a commodity price
    Price(Price),
}

impl Directive {
    /// Get the date of this directive.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(t) => t.date,
            Self::Balance(b) => b.date,
            Self::Open(o) => o.date,
            Self::Close(c) => c.date,
            Self::Pad(p) => p.date,
            Self::Price(p) => p.date,
        }
    }

    /// Get the source origin of this directive.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        match self {
            Self::Transaction(t) => &t.origin,
            Self::Balance(b) => &b.origin,
            Self::Open(o) => &o.origin,
            Self::Close(c) => &c.origin,
            Self::Pad(p) => &p.origin,
            Self::Price(p) => &p.origin,
        }
    }

    /// Get the directive type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Balance(_) => "balance",
            Self::Open(_) => "open",
            Self::Close(_) => "close",
            Self::Pad(_) => "pad",
            Self::Price(_) => "price",
        }
    }

    /// Get the same-day ordering priority for this directive.
    #[must_use]
    pub const fn priority(&self) -> DirectivePriority {
        match self {
            Self::Open(_) => DirectivePriority::Open,
            Self::Close(_) => DirectivePriority::Close,
            Self::Pad(_) => DirectivePriority::Pad,
            Self::Balance(_) => DirectivePriority::Balance,
            Self::Price(_) => DirectivePriority::Price,
            Self::Transaction(_) => DirectivePriority::Transaction,
        }
    }
}

/// Sort directives by date, then by same-day priority.
///
/// The sort is stable: directives with equal date and priority keep their
/// input order (parent file first, then included files depth-first).
pub fn sort_directives(directives: &mut [Directive]) {
    directives.sort_by(|a, b| {
        a.date()
            .cmp(&b.date())
            .then_with(|| a.priority().cmp(&b.priority()))
    });
}

/// A transaction directive.
///
/// Transactions record transfers between accounts and must balance: the
/// sum of all posting values per effective commodity is zero once the
/// blank leg is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Transaction flag (`*`, `!`, or `P` for synthesised padding)
    pub flag: char,
    /// Payee (optional)
    pub payee: Option<String>,
    /// Narration (description)
    pub narration: String,
    /// Postings (account entries)
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Create a new transaction.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            origin: Origin::default(),
            flag: '*',
            payee: None,
            narration: narration.into(),
            postings: Vec::new(),
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = flag;
        self
    }

    /// Set the payee.
    #[must_use]
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Price directives implied by this transaction's postings.
    ///
    /// Every posting that carries a per-unit conversion price records that
    /// price for its commodity. The synthesised directives inherit the
    /// transaction's date and origin but sort with the price priority.
    #[must_use]
    pub fn implicit_prices(&self) -> Vec<Price> {
        let mut prices = Vec::new();
        for posting in &self.postings {
            if let (Some(units), Some(price)) = (&posting.units, &posting.price) {
                prices.push(Price {
                    date: self.date,
                    origin: self.origin.clone(),
                    currency: units.currency.clone(),
                    amount: price.clone(),
                });
            }
        }
        prices
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, "\"{payee}\" ")?;
        }
        write!(f, "\"{}\"", self.narration)?;
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// A balance assertion directive.
///
/// Asserts that an account holds a specific balance at the start of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Assertion date
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Account to check
    pub account: String,
    /// Expected amount
    pub amount: Amount,
}

impl Balance {
    /// Create a new balance assertion.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            origin: Origin::default(),
            account: account.into(),
            amount,
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} balance {} {}", self.date, self.account, self.amount)
    }
}

/// An open account directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    /// Date the account opens
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Account name (e.g., "Assets:Bank:Checking")
    pub account: String,
    /// Allowed currencies (empty = any currency allowed)
    pub currencies: Vec<String>,
}

impl Open {
    /// Create a new open directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            origin: Origin::default(),
            account: account.into(),
            currencies: Vec::new(),
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Set allowed currencies.
    #[must_use]
    pub fn with_currencies(mut self, currencies: Vec<String>) -> Self {
        self.currencies = currencies;
        self
    }
}

impl fmt::Display for Open {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} open {}", self.date, self.account)?;
        if !self.currencies.is_empty() {
            write!(f, " {}", self.currencies.join(";"))?;
        }
        Ok(())
    }
}

/// A close account directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    /// Date the account closes
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Account name
    pub account: String,
}

impl Close {
    /// Create a new close directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            origin: Origin::default(),
            account: account.into(),
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

impl fmt::Display for Close {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} close {}", self.date, self.account)
    }
}

/// A pad directive.
///
/// Permits the next balance assertion on `account` to insert a synthetic
/// transaction against `source_account` making the assertion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad date
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Account to pad
    pub account: String,
    /// Account the padding difference is drawn from
    pub source_account: String,
}

impl Pad {
    /// Create a new pad directive.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        account: impl Into<String>,
        source_account: impl Into<String>,
    ) -> Self {
        Self {
            date,
            origin: Origin::default(),
            account: account.into(),
            source_account: source_account.into(),
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pad {} {}",
            self.date, self.account, self.source_account
        )
    }
}

/// A price directive.
///
/// Records the price of a commodity in another currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price date
    pub date: NaiveDate,
    /// Source location
    pub origin: Origin,
    /// Currency being priced
    pub currency: String,
    /// Price amount (in another currency)
    pub amount: Amount,
}

impl Price {
    /// Create a new price directive.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            origin: Origin::default(),
            currency: currency.into(),
            amount,
        }
    }

    /// Set the source origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} price {} {}", self.date, self.currency, self.amount)
    }
}
