//! Semantic evaluation errors.

use beanbook_core::{Amount, Origin};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A semantic error raised by a directive's apply step.
///
/// Apply errors never abort evaluation; they are collected and returned
/// alongside the final state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: {kind}")]
pub struct EvalError {
    /// What went wrong.
    pub kind: EvalErrorKind,
    /// Date of the directive that failed.
    pub date: NaiveDate,
    /// Source location of the directive that failed.
    pub origin: Origin,
}

impl EvalError {
    /// Create a new evaluation error.
    #[must_use]
    pub const fn new(kind: EvalErrorKind, date: NaiveDate, origin: Origin) -> Self {
        Self { kind, date, origin }
    }
}

/// Kinds of semantic evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    /// A directive referenced an account that was never opened.
    #[error("unknown account {0}")]
    UnknownAccount(String),

    /// An open directive hit an account already open on that date.
    #[error("account {0} is already open")]
    AlreadyOpen(String),

    /// A close directive hit an account with no open interval left.
    #[error("account {0} is already closed")]
    AlreadyClosed(String),

    /// A posting targeted an account outside its open intervals.
    #[error("account {0} is not open")]
    NotOpen(String),

    /// A pad named an account that is closed on the pad date.
    #[error("account {0} is closed")]
    AccountClosed(String),

    /// A reopen tried to alter the account's allowed commodity set.
    #[error("cannot change currencies of account {0}")]
    CurrencyChange(String),

    /// A posting used a commodity outside the account's allowed set.
    #[error("currency {currency} is not allowed in account {account}")]
    CurrencyNotAllowed {
        /// The account with the constraint.
        account: String,
        /// The offending commodity.
        currency: String,
    },

    /// A balance assertion failed with no pad to consume.
    #[error("balance of {account} expected {expected} but calculated {calculated}")]
    BalanceMismatch {
        /// The asserted account.
        account: String,
        /// The asserted amount.
        expected: Amount,
        /// The book balance at the assertion.
        calculated: Decimal,
    },

    /// A pad replaced an earlier pad that was never consumed.
    #[error("unused pad of account {0}")]
    UnusedPad(String),

    /// The synthesised padding transaction did not land on the asserted
    /// amount exactly.
    #[error("could not create pad transaction for {0}")]
    PadFailed(String),

    /// A transaction carried more than one blank posting.
    #[error("more than one blank posting")]
    MultipleBlankPostings,

    /// A blank posting met more than one effective commodity.
    #[error("mixed currencies in postings")]
    MixedCommodities,

    /// A blank posting had no non-blank posting to balance against.
    #[error("blank posting could not be resolved")]
    UnresolvedBlank,

    /// A fully specified transaction did not sum to zero.
    #[error("transaction does not balance: {residual} {currency} left over")]
    Unbalanced {
        /// The commodity with a residual.
        currency: String,
        /// The leftover sum.
        residual: Decimal,
    },

    /// A `{ }` reduction found no lots to consume.
    #[error("no lots of {currency} held in {account}")]
    NoLots {
        /// The reducing account.
        account: String,
        /// The reduced commodity.
        currency: String,
    },

    /// A `{ }` reduction did not match the held lots exactly.
    #[error("lots of {currency} in {account} sum to {held}, posting requires {required}")]
    LotMismatch {
        /// The reducing account.
        account: String,
        /// The reduced commodity.
        currency: String,
        /// Units held across the bucket's lots.
        held: Decimal,
        /// Units the posting needs to consume.
        required: Decimal,
    },
}
