//! Structural parse error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A structural parse error attached to its source location.
///
/// Parse errors drop the offending directive from the stream; they are
/// accumulated by the loader rather than aborting the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{}: {}", .file.display(), .line, .kind)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The file the error occurred in.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, file: &Path, line: usize) -> Self {
        Self {
            kind,
            file: file.to_path_buf(),
            line,
        }
    }
}

/// Kinds of structural parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A directive keyword that is not part of the grammar.
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
    /// A number that does not parse as a decimal.
    #[error("can not parse amount value '{0}'")]
    InvalidNumber(String),
    /// A commodity name outside `[A-Z][A-Z0-9_]*`.
    #[error("invalid currency '{0}'")]
    InvalidCurrency(String),
    /// A header line with more tokens than its directive allows.
    #[error("more tokens than expected")]
    TooManyTokens,
    /// A required token is absent.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// A posting amount without its commodity.
    #[error("expected currency after number")]
    MissingCurrency,
    /// A `{` cost annotation without its matching `}`.
    #[error("unbalanced braces in cost")]
    UnbalancedCost,
    /// A `@@` total price on a posting of zero units.
    #[error("total price on zero amount")]
    TotalPriceOnZero,
    /// A token where the posting grammar allows none.
    #[error("unexpected token '{0}' in posting")]
    UnexpectedToken(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = ParseError::new(
            ParseErrorKind::TooManyTokens,
            Path::new("ledger.bean"),
            17,
        );
        assert_eq!(format!("{err}"), "ledger.bean:17: more tokens than expected");
    }

    #[test]
    fn test_display_kinds() {
        let cases = [
            (
                ParseErrorKind::UnknownDirective("opne".into()),
                "unknown directive 'opne'",
            ),
            (
                ParseErrorKind::InvalidNumber("12..0".into()),
                "can not parse amount value '12..0'",
            ),
            (
                ParseErrorKind::InvalidCurrency("usd".into()),
                "invalid currency 'usd'",
            ),
            (ParseErrorKind::MissingField("account name"), "missing account name"),
            (ParseErrorKind::UnbalancedCost, "unbalanced braces in cost"),
        ];
        for (kind, expected) in cases {
            assert_eq!(format!("{kind}"), expected);
        }
    }
}
