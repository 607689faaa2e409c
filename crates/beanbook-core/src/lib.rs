//! Core types for beanbook
//!
//! This crate provides the fundamental types used throughout the beanbook
//! project:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Lot`] - One acquisition of a position, held at cost
//! - [`Directive`] - All directive types (Transaction, Balance, Open, etc.)
//! - [`sort_directives`] - The stable chronological ordering every ledger
//!   is evaluated in
//!
//! # Example
//!
//! ```
//! use beanbook_core::{sort_directives, Amount, Directive, Open, Transaction};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let mut directives = vec![
//!     Directive::Transaction(Transaction::new(date, "Coffee")),
//!     Directive::Open(Open::new(date, "Assets:Cash")),
//! ];
//!
//! // Opens sort before same-day transactions.
//! sort_directives(&mut directives);
//! assert_eq!(directives[0].type_name(), "open");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod directive;
pub mod lot;

pub use amount::Amount;
pub use directive::{
    has_recognised_root, sort_directives, Balance, Close, CostSpec, Directive, DirectivePriority,
    Open, Origin, Pad, Posting, Price, Transaction, ACCOUNT_ROOTS,
};
pub use lot::Lot;

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
