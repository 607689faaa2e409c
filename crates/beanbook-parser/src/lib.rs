//! Line-oriented parser for the Beancount subset beanbook ingests.
//!
//! The pipeline runs in three leaves-first stages, each usable on its own:
//!
//! 1. [`scan`] - a character-driven scanner producing [`Line`]s of flagged
//!    [`Token`]s (line number, indent flag, quoted flag)
//! 2. [`group_lines`] - folds lines into [`LineGroup`]s: a header line plus
//!    its indented continuations, delimited by blank lines
//! 3. [`parse`] - the directive factory, building typed [`Entry`]s and
//!    accumulating [`ParseError`]s without ever aborting a file
//!
//! # Example
//!
//! ```
//! use beanbook_parser::{parse, Entry};
//! use std::path::Path;
//!
//! let source = "\
//! 2024-01-15 * \"Coffee Shop\" \"Morning coffee\"
//!   Expenses:Food:Coffee  5.00 USD
//!   Assets:Cash
//! ";
//!
//! let result = parse(source, Path::new("ledger.bean"));
//! assert!(result.errors.is_empty());
//! assert_eq!(result.entries.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod group;
mod parse;
mod scan;

pub use error::{ParseError, ParseErrorKind};
pub use group::{group_lines, LineGroup};
pub use parse::{parse, Entry, ParseResult};
pub use scan::{scan, Line, Token};
