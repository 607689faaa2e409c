//! Directive factory: turns line groups into typed directives.
//!
//! Dispatch is on the first header token. Groups whose first token is not a
//! date and not a recognised meta keyword are not directives and are
//! silently skipped; a valid date followed by an unknown keyword is a
//! structural error. Each variant has a parse contract bounding the number
//! of header tokens.

use std::path::Path;
use std::str::FromStr;

use beanbook_core::{
    has_recognised_root, Amount, Balance, Close, CostSpec, Directive, Open, Origin, Pad, Posting,
    Price, Transaction,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{ParseError, ParseErrorKind};
use crate::group::LineGroup;
use crate::scan::{Line, Token};

/// One ledger-level entry produced by the factory.
///
/// Besides directives proper, a group can carry an `option` setting or an
/// `include` reference that the loader acts on in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A dated directive for the evaluation stream.
    Directive(Directive),
    /// A ledger-wide `option "name" "value"` setting.
    Option {
        /// Option name
        name: String,
        /// Option value
        value: String,
    },
    /// An `include "path"` reference, relative to the including file.
    Include {
        /// The path as written
        path: String,
    },
}

/// Result of parsing one source file.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Entries in input order. A transaction is immediately followed by
    /// the price directives its postings imply.
    pub entries: Vec<Entry>,
    /// Structural errors; each offending group was dropped.
    pub errors: Vec<ParseError>,
}

/// Parse one file's source text into entries.
///
/// Scanning, grouping and directive construction run in one pass; errors
/// never abort the file.
#[must_use]
pub fn parse(source: &str, file: &Path) -> ParseResult {
    let mut result = ParseResult::default();
    for group in crate::group::group_lines(crate::scan::scan(source)) {
        match build_entries(&group, file) {
            Ok(entries) => result.entries.extend(entries),
            Err(err) => result.errors.push(err),
        }
    }
    result
}

/// Build the entries for one group.
///
/// Returns an empty vector for groups that are not directives (comments
/// already never reach this far; unrecognised prose and `pushtag`/`poptag`
/// land here).
fn build_entries(group: &LineGroup, file: &Path) -> Result<Vec<Entry>, ParseError> {
    let header = group.header();
    let Some(first) = header.tokens.first() else {
        return Ok(Vec::new());
    };
    match first.text.as_str() {
        "option" => parse_option(header, file).map(|e| vec![e]),
        "include" => parse_include(header, file).map(|e| vec![e]),
        "pushtag" | "poptag" => Ok(Vec::new()),
        text => {
            let Some(date) = parse_date(text) else {
                return Ok(Vec::new());
            };
            build_directive(group, date, file)
        }
    }
}

fn build_directive(
    group: &LineGroup,
    date: NaiveDate,
    file: &Path,
) -> Result<Vec<Entry>, ParseError> {
    let header = group.header();
    let origin = Origin::new(file, header.number);
    let keyword = header
        .tokens
        .get(1)
        .ok_or_else(|| err_at(ParseErrorKind::MissingField("directive keyword"), file, header))?;

    let directive = match keyword.text.as_str() {
        "open" => vec![Entry::Directive(Directive::Open(parse_open(
            header, date, origin, file,
        )?))],
        "close" => vec![Entry::Directive(Directive::Close(parse_close(
            header, date, origin, file,
        )?))],
        "balance" => vec![Entry::Directive(Directive::Balance(parse_balance(
            header, date, origin, file,
        )?))],
        "pad" => vec![Entry::Directive(Directive::Pad(parse_pad(
            header, date, origin, file,
        )?))],
        "price" => vec![Entry::Directive(Directive::Price(parse_price(
            header, date, origin, file,
        )?))],
        _ => {
            let txn = parse_transaction(group, date, origin, file)?;
            let mut entries = Vec::with_capacity(1 + txn.postings.len());
            let prices = txn.implicit_prices();
            entries.push(Entry::Directive(Directive::Transaction(txn)));
            entries.extend(
                prices
                    .into_iter()
                    .map(|p| Entry::Directive(Directive::Price(p))),
            );
            entries
        }
    };
    Ok(directive)
}

fn parse_option(header: &Line, file: &Path) -> Result<Entry, ParseError> {
    if header.tokens.len() > 3 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let name = required(header, 1, "option name", file)?;
    let value = required(header, 2, "option value", file)?;
    Ok(Entry::Option {
        name: name.text.clone(),
        value: value.text.clone(),
    })
}

fn parse_include(header: &Line, file: &Path) -> Result<Entry, ParseError> {
    if header.tokens.len() > 2 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let path = required(header, 1, "include path", file)?;
    Ok(Entry::Include {
        path: path.text.clone(),
    })
}

fn parse_open(
    header: &Line,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Open, ParseError> {
    if header.tokens.len() > 5 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let account = required(header, 2, "account name", file)?.text.clone();
    let mut currencies = Vec::new();
    if let Some(token) = header.tokens.get(3) {
        for name in token.text.split(';').filter(|s| !s.is_empty()) {
            currencies.push(parse_currency_str(name, file, header.number)?);
        }
    }
    Ok(Open::new(date, account)
        .with_currencies(currencies)
        .with_origin(origin))
}

fn parse_close(
    header: &Line,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Close, ParseError> {
    if header.tokens.len() > 3 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let account = required(header, 2, "account name", file)?.text.clone();
    Ok(Close::new(date, account).with_origin(origin))
}

fn parse_balance(
    header: &Line,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Balance, ParseError> {
    if header.tokens.len() > 5 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let account = required(header, 2, "account name", file)?.text.clone();
    let number = parse_decimal(required(header, 3, "amount", file)?, file, header.number)?;
    let currency = parse_currency(required(header, 4, "currency", file)?, file, header.number)?;
    Ok(Balance::new(date, account, Amount::new(number, currency)).with_origin(origin))
}

fn parse_pad(
    header: &Line,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Pad, ParseError> {
    if header.tokens.len() > 4 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let account = required(header, 2, "account name", file)?.text.clone();
    let source = required(header, 3, "source account name", file)?.text.clone();
    Ok(Pad::new(date, account, source).with_origin(origin))
}

fn parse_price(
    header: &Line,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Price, ParseError> {
    if header.tokens.len() > 5 {
        return Err(err_at(ParseErrorKind::TooManyTokens, file, header));
    }
    let currency = parse_currency(required(header, 2, "currency", file)?, file, header.number)?;
    let number = parse_decimal(required(header, 3, "amount", file)?, file, header.number)?;
    let price_currency =
        parse_currency(required(header, 4, "currency", file)?, file, header.number)?;
    Ok(Price::new(date, currency, Amount::new(number, price_currency)).with_origin(origin))
}

fn parse_transaction(
    group: &LineGroup,
    date: NaiveDate,
    origin: Origin,
    file: &Path,
) -> Result<Transaction, ParseError> {
    let header = group.header();
    let status = &header.tokens[1];
    let flag = match status.text.as_str() {
        "*" | "txn" => '*',
        "!" => '!',
        "P" | "p" => 'P',
        other => {
            return Err(err_at(
                ParseErrorKind::UnknownDirective(other.to_string()),
                file,
                header,
            ))
        }
    };

    let quoted: Vec<&str> = header.tokens[2..]
        .iter()
        .filter(|t| t.quoted)
        .map(|t| t.text.as_str())
        .collect();
    let (payee, narration) = match quoted.as_slice() {
        [] => (None, String::new()),
        [narration] => (None, (*narration).to_string()),
        [payee, narration] => (Some((*payee).to_string()), (*narration).to_string()),
        _ => return Err(err_at(ParseErrorKind::TooManyTokens, file, header)),
    };

    let mut txn = Transaction::new(date, narration)
        .with_flag(flag)
        .with_origin(origin);
    if let Some(payee) = payee {
        txn = txn.with_payee(payee);
    }
    for line in &group.lines[1..] {
        if let Some(posting) = parse_posting(line, file)? {
            txn.postings.push(posting);
        }
    }
    Ok(txn)
}

/// Parse one continuation line as a posting.
///
/// Lines whose first token does not name an account under a recognised
/// root are not postings (metadata and the like) and yield `None`.
fn parse_posting(line: &Line, file: &Path) -> Result<Option<Posting>, ParseError> {
    let account = &line.tokens[0];
    if account.quoted || !has_recognised_root(&account.text) {
        return Ok(None);
    }
    if line.tokens.len() == 1 {
        return Ok(Some(Posting::blank(account.text.clone())));
    }
    if line.tokens.len() == 2 {
        return Err(ParseError::new(
            ParseErrorKind::MissingCurrency,
            file,
            line.number,
        ));
    }

    let number = parse_decimal(&line.tokens[1], file, line.number)?;
    let currency = parse_currency(&line.tokens[2], file, line.number)?;
    let mut posting = Posting::new(account.text.clone(), Amount::new(number, currency));

    let rest = &line.tokens[3..];
    let consumed = match rest.first().map(|t| t.text.as_str()) {
        None => 0,
        Some("{") => {
            if rest.get(1).is_some_and(|t| t.text == "}") {
                posting = posting.with_cost(CostSpec::Implicit);
                2
            } else if rest.len() >= 4 && rest[3].text == "}" {
                let cost_number = parse_decimal(&rest[1], file, line.number)?;
                let cost_currency = parse_currency(&rest[2], file, line.number)?;
                posting = posting.with_cost(CostSpec::PerUnit(Amount::new(
                    cost_number,
                    cost_currency,
                )));
                4
            } else {
                return Err(ParseError::new(
                    ParseErrorKind::UnbalancedCost,
                    file,
                    line.number,
                ));
            }
        }
        Some("@") => {
            let price_number =
                parse_decimal(token_at(rest, 1, "price amount", file, line)?, file, line.number)?;
            let price_currency =
                parse_currency(token_at(rest, 2, "price currency", file, line)?, file, line.number)?;
            posting = posting.with_price(Amount::new(price_number, price_currency));
            3
        }
        Some("@@") => {
            let total =
                parse_decimal(token_at(rest, 1, "price amount", file, line)?, file, line.number)?;
            let price_currency =
                parse_currency(token_at(rest, 2, "price currency", file, line)?, file, line.number)?;
            if number.is_zero() {
                return Err(ParseError::new(
                    ParseErrorKind::TotalPriceOnZero,
                    file,
                    line.number,
                ));
            }
            posting = posting.with_price(Amount::new(total / number.abs(), price_currency));
            3
        }
        Some(other) => {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken(other.to_string()),
                file,
                line.number,
            ));
        }
    };
    if rest.len() > consumed {
        return Err(ParseError::new(
            ParseErrorKind::TooManyTokens,
            file,
            line.number,
        ));
    }
    Ok(Some(posting))
}

/// Strict `YYYY-MM-DD`; anything else is not a date.
fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse a decimal literal, stripping comma thousand-separators first.
fn parse_decimal(token: &Token, file: &Path, line: usize) -> Result<Decimal, ParseError> {
    Decimal::from_str(&token.text.replace(',', "")).map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidNumber(token.text.clone()),
            file,
            line,
        )
    })
}

fn parse_currency(token: &Token, file: &Path, line: usize) -> Result<String, ParseError> {
    parse_currency_str(&token.text, file, line)
}

/// Commodity names are `[A-Z][A-Z0-9_]*`.
fn parse_currency_str(text: &str, file: &Path, line: usize) -> Result<String, ParseError> {
    let mut chars = text.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(text.to_string())
    } else {
        Err(ParseError::new(
            ParseErrorKind::InvalidCurrency(text.to_string()),
            file,
            line,
        ))
    }
}

fn required<'a>(
    header: &'a Line,
    index: usize,
    what: &'static str,
    file: &Path,
) -> Result<&'a Token, ParseError> {
    header
        .tokens
        .get(index)
        .ok_or_else(|| err_at(ParseErrorKind::MissingField(what), file, header))
}

fn token_at<'a>(
    tokens: &'a [Token],
    index: usize,
    what: &'static str,
    file: &Path,
    line: &Line,
) -> Result<&'a Token, ParseError> {
    tokens
        .get(index)
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingField(what), file, line.number))
}

fn err_at(kind: ParseErrorKind, file: &Path, header: &Line) -> ParseError {
    ParseError::new(kind, file, header.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_one(source: &str) -> Directive {
        let result = parse(source, Path::new("test.bean"));
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        result
            .entries
            .into_iter()
            .find_map(|e| match e {
                Entry::Directive(d) => Some(d),
                _ => None,
            })
            .expect("no directive parsed")
    }

    fn parse_err(source: &str) -> ParseErrorKind {
        let result = parse(source, Path::new("test.bean"));
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        result.errors[0].kind.clone()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_open() {
        let Directive::Open(open) = parse_one("2024-01-01 open Assets:Bank:Checking USD;EUR\n")
        else {
            panic!("expected open");
        };
        assert_eq!(open.date, date(2024, 1, 1));
        assert_eq!(open.account, "Assets:Bank:Checking");
        assert_eq!(open.currencies, vec!["USD", "EUR"]);
        assert_eq!(open.origin.line, 1);
    }

    #[test]
    fn test_parse_open_no_currencies() {
        let Directive::Open(open) = parse_one("2024-01-01 open Assets:Bank\n") else {
            panic!("expected open");
        };
        assert!(open.currencies.is_empty());
    }

    #[test]
    fn test_parse_open_lowercase_currency_rejected() {
        assert_eq!(
            parse_err("2024-01-01 open Assets:Bank usd\n"),
            ParseErrorKind::InvalidCurrency("usd".into())
        );
    }

    #[test]
    fn test_parse_close() {
        let Directive::Close(close) = parse_one("2024-06-01 close Assets:Bank\n") else {
            panic!("expected close");
        };
        assert_eq!(close.date, date(2024, 6, 1));
        assert_eq!(close.account, "Assets:Bank");
    }

    #[test]
    fn test_parse_balance() {
        let Directive::Balance(bal) = parse_one("2024-02-01 balance Assets:Bank 1,234.50 USD\n")
        else {
            panic!("expected balance");
        };
        assert_eq!(bal.amount, Amount::new(dec!(1234.50), "USD"));
        assert_eq!(bal.account, "Assets:Bank");
    }

    #[test]
    fn test_parse_pad() {
        let Directive::Pad(pad) = parse_one("2024-02-01 pad Assets:Bank Equity:Opening-Balances\n")
        else {
            panic!("expected pad");
        };
        assert_eq!(pad.account, "Assets:Bank");
        assert_eq!(pad.source_account, "Equity:Opening-Balances");
    }

    #[test]
    fn test_parse_price() {
        let Directive::Price(price) = parse_one("2024-02-01 price USD 0.92 EUR\n") else {
            panic!("expected price");
        };
        assert_eq!(price.currency, "USD");
        assert_eq!(price.amount, Amount::new(dec!(0.92), "EUR"));
    }

    #[test]
    fn test_parse_transaction_full_header() {
        let Directive::Transaction(txn) = parse_one(
            "2024-01-15 * \"Corner Shop\" \"weekly shop\"\n  Expenses:Food 50.00 USD\n  Assets:Cash\n",
        ) else {
            panic!("expected transaction");
        };
        assert_eq!(txn.flag, '*');
        assert_eq!(txn.payee.as_deref(), Some("Corner Shop"));
        assert_eq!(txn.narration, "weekly shop");
        assert_eq!(txn.postings.len(), 2);
        assert_eq!(
            txn.postings[0].units,
            Some(Amount::new(dec!(50.00), "USD"))
        );
        assert!(txn.postings[1].is_blank());
    }

    #[test]
    fn test_parse_transaction_single_string_is_narration() {
        let Directive::Transaction(txn) = parse_one("2024-01-15 ! \"only narration\"\n") else {
            panic!("expected transaction");
        };
        assert_eq!(txn.flag, '!');
        assert!(txn.payee.is_none());
        assert_eq!(txn.narration, "only narration");
    }

    #[test]
    fn test_parse_txn_keyword_normalises_to_star() {
        let Directive::Transaction(txn) = parse_one("2024-01-15 txn \"x\"\n") else {
            panic!("expected transaction");
        };
        assert_eq!(txn.flag, '*');
    }

    #[test]
    fn test_parse_transaction_metadata_line_skipped() {
        let Directive::Transaction(txn) = parse_one(
            "2024-01-15 * \"x\"\n  note: something\n  Assets:Cash 1.00 USD\n  Income:Job\n",
        ) else {
            panic!("expected transaction");
        };
        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].account, "Assets:Cash");
    }

    #[test]
    fn test_parse_posting_cost_per_unit() {
        let Directive::Transaction(txn) = parse_one(
            "2024-01-15 * \"buy\"\n  Assets:Inv 10 GOOG {500.00 USD}\n  Assets:Cash -5000.00 USD\n",
        ) else {
            panic!("expected transaction");
        };
        assert_eq!(
            txn.postings[0].cost,
            Some(CostSpec::PerUnit(Amount::new(dec!(500.00), "USD")))
        );
    }

    #[test]
    fn test_parse_posting_cost_implicit() {
        let Directive::Transaction(txn) =
            parse_one("2024-01-15 * \"sell\"\n  Assets:Inv -10 GOOG { }\n  Assets:Cash 5000.00 USD\n")
        else {
            panic!("expected transaction");
        };
        assert_eq!(txn.postings[0].cost, Some(CostSpec::Implicit));
    }

    #[test]
    fn test_parse_posting_unit_price() {
        let Directive::Transaction(txn) = parse_one(
            "2024-02-01 * \"fx\"\n  Assets:X -10 USD @ 0.90 EUR\n  Assets:Y 9.00 EUR\n",
        ) else {
            panic!("expected transaction");
        };
        assert_eq!(
            txn.postings[0].price,
            Some(Amount::new(dec!(0.90), "EUR"))
        );
    }

    #[test]
    fn test_parse_posting_total_price_divides() {
        let Directive::Transaction(txn) = parse_one(
            "2024-02-01 * \"buy\"\n  Assets:X 10 FOO @@ 20 USD\n  Assets:Cash -20 USD\n",
        ) else {
            panic!("expected transaction");
        };
        assert_eq!(txn.postings[0].price, Some(Amount::new(dec!(2), "USD")));
    }

    #[test]
    fn test_parse_total_price_on_zero_amount() {
        assert_eq!(
            parse_err("2024-02-01 * \"x\"\n  Assets:X 0 FOO @@ 20 USD\n"),
            ParseErrorKind::TotalPriceOnZero
        );
    }

    #[test]
    fn test_implicit_price_entries_follow_transaction() {
        let result = parse(
            "2024-02-01 * \"fx\"\n  Assets:X -10 USD @ 0.90 EUR\n  Assets:Y 9.00 EUR\n",
            Path::new("test.bean"),
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.entries.len(), 2);
        let Entry::Directive(Directive::Price(price)) = &result.entries[1] else {
            panic!("expected implicit price entry");
        };
        assert_eq!(price.currency, "USD");
        assert_eq!(price.amount, Amount::new(dec!(0.90), "EUR"));
        assert_eq!(price.origin.line, 1);
    }

    #[test]
    fn test_parse_option() {
        let result = parse("option \"operating_currency\" \"EUR\"\n", Path::new("t"));
        assert_eq!(
            result.entries,
            vec![Entry::Option {
                name: "operating_currency".into(),
                value: "EUR".into()
            }]
        );
    }

    #[test]
    fn test_parse_include() {
        let result = parse("include \"accounts.bean\"\n", Path::new("t"));
        assert_eq!(
            result.entries,
            vec![Entry::Include {
                path: "accounts.bean".into()
            }]
        );
    }

    #[test]
    fn test_pushtag_poptag_are_noops() {
        let result = parse("pushtag #trip\npoptag #trip\n", Path::new("t"));
        assert!(result.entries.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_non_directive_group_skipped() {
        let result = parse("some prose that is not a directive\n", Path::new("t"));
        assert!(result.entries.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_unknown_keyword_after_date_is_error() {
        assert_eq!(
            parse_err("2024-01-01 opne Assets:Bank\n"),
            ParseErrorKind::UnknownDirective("opne".into())
        );
    }

    #[test]
    fn test_too_many_tokens_on_close() {
        assert_eq!(
            parse_err("2024-01-01 close Assets:Bank extra\n"),
            ParseErrorKind::TooManyTokens
        );
    }

    #[test]
    fn test_bad_decimal_in_balance() {
        assert_eq!(
            parse_err("2024-01-01 balance Assets:Bank 12..0 USD\n"),
            ParseErrorKind::InvalidNumber("12..0".into())
        );
    }

    #[test]
    fn test_posting_amount_without_currency() {
        assert_eq!(
            parse_err("2024-01-01 * \"x\"\n  Assets:Cash 1.00\n"),
            ParseErrorKind::MissingCurrency
        );
    }

    #[test]
    fn test_posting_unbalanced_cost_braces() {
        assert_eq!(
            parse_err("2024-01-01 * \"x\"\n  Assets:Inv 10 GOOG {500.00 USD\n"),
            ParseErrorKind::UnbalancedCost
        );
    }

    #[test]
    fn test_error_carries_file_and_line() {
        let result = parse(
            "2024-01-01 open Assets:Bank\n2024-01-02 balance Assets:Bank nope USD\n",
            Path::new("main.bean"),
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file, Path::new("main.bean"));
        assert_eq!(result.errors[0].line, 2);
        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn test_multiline_narration_preserved() {
        let Directive::Transaction(txn) =
            parse_one("2024-01-15 * \"line one\nline two\"\n  Assets:Cash\n")
        else {
            panic!("expected transaction");
        };
        assert_eq!(txn.narration, "line one\nline two");
    }
}
