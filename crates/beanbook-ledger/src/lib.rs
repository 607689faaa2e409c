//! Stateful directive evaluator.
//!
//! This crate walks a chronologically sorted directive stream and applies
//! each directive to a single mutable [`LedgerState`], enforcing the
//! accounting invariants: accounts are open when used, commodities respect
//! per-account allowed sets, transactions balance per effective commodity,
//! and balance assertions hold (consuming a pending pad when they would
//! not).
//!
//! Apply errors are not fatal: each failing directive leaves the state
//! untouched, contributes one [`EvalError`] annotated with `file:line`,
//! and evaluation continues.
//!
//! # Example
//!
//! ```
//! use beanbook_core::{Amount, Directive, Open, Posting, Transaction};
//! use beanbook_ledger::evaluate;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let day1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let day2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let directives = vec![
//!     Directive::Open(Open::new(day1, "Assets:Bank")),
//!     Directive::Open(Open::new(day1, "Income:Job")),
//!     Directive::Transaction(
//!         Transaction::new(day2, "Salary")
//!             .with_posting(Posting::new("Assets:Bank", Amount::new(dec!(100.00), "EUR")))
//!             .with_posting(Posting::blank("Income:Job")),
//!     ),
//! ];
//!
//! let result = evaluate(&directives);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.state.balance("Assets:Bank", "EUR"), dec!(100.00));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod apply;
mod error;
mod state;

pub use error::{EvalError, EvalErrorKind};
pub use state::{Account, LedgerState, PricePoint};

use beanbook_core::Directive;

/// The final state plus every error the walk collected.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// The accumulated ledger state.
    pub state: LedgerState,
    /// Semantic errors, in application order.
    pub errors: Vec<EvalError>,
}

/// Apply every directive, in the order given, to a fresh state.
///
/// The caller is expected to hand over the stream already sorted by
/// (date, same-day priority); the loader does this.
#[must_use]
pub fn evaluate(directives: &[Directive]) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for directive in directives {
        if let Err(kind) = apply::apply_directive(&mut evaluation.state, directive) {
            evaluation.errors.push(EvalError::new(
                kind,
                directive.date(),
                directive.origin().clone(),
            ));
        }
    }
    evaluation
}
