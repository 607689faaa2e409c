//! Balance report sink over a finished ledger state.

use anyhow::Result;
use beanbook_ledger::LedgerState;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Write;

/// Print the flat balance listing: one row per (account, commodity) pair,
/// accounts alphabetical, commodities alphabetical within an account.
///
/// Accounts that were opened but never touched get a zero row in the first
/// operating currency, when one is declared. `filter` restricts the
/// listing to accounts whose name contains the substring.
pub fn print_balances<W: Write>(
    state: &LedgerState,
    operating_currencies: &[String],
    filter: Option<&str>,
    writer: &mut W,
) -> std::io::Result<()> {
    let mut rows: Vec<(&str, &str, Decimal)> = Vec::new();
    let mut accounts: Vec<&String> = state.accounts.keys().collect();
    accounts.sort();

    for account in accounts {
        if filter.is_some_and(|needle| !account.contains(needle)) {
            continue;
        }
        let mut entries: Vec<(&String, Decimal)> = state
            .balances
            .get(account)
            .into_iter()
            .flatten()
            .map(|(currency, number)| (currency, *number))
            .collect();
        entries.sort_by_key(|(currency, _)| currency.clone());

        if entries.is_empty() {
            if let Some(first) = operating_currencies.first() {
                rows.push((account, first, Decimal::ZERO));
            }
        } else {
            for (currency, number) in entries {
                rows.push((account, currency, number));
            }
        }
    }

    let width = rows.iter().map(|(account, _, _)| account.len()).max().unwrap_or(0);
    for (account, currency, number) in rows {
        writeln!(writer, "{account:<width$}  {number} {currency}")?;
    }
    Ok(())
}

/// Serialize the balances map as pretty-printed JSON.
pub fn print_balances_json<W: Write>(state: &LedgerState, writer: &mut W) -> Result<()> {
    let balances: BTreeMap<&String, BTreeMap<&String, Decimal>> = state
        .balances
        .iter()
        .map(|(account, by_currency)| {
            (
                account,
                by_currency
                    .iter()
                    .map(|(currency, number)| (currency, *number))
                    .collect(),
            )
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &balances)?;
    writeln!(writer)?;
    Ok(())
}

/// Print the closing summary line.
pub fn print_summary<W: Write>(errors: usize, writer: &mut W) -> std::io::Result<()> {
    if errors == 0 {
        writeln!(writer, "\x1b[32m\u{2713}\x1b[0m No errors found")?;
    } else {
        let error_text = if errors == 1 { "error" } else { "errors" };
        writeln!(writer, "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanbook_core::{Amount, Directive, Open, Posting, Transaction};
    use beanbook_ledger::evaluate;
    use beanbook_core::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_state() -> LedgerState {
        let directives = vec![
            Directive::Open(Open::new(date(2024, 1, 1), "Assets:Bank")),
            Directive::Open(Open::new(date(2024, 1, 1), "Income:Job")),
            Directive::Open(Open::new(date(2024, 1, 1), "Equity:Opening-Balances")),
            Directive::Transaction(
                Transaction::new(date(2024, 1, 2), "salary")
                    .with_posting(Posting::new("Assets:Bank", Amount::new(dec!(79.50), "EUR")))
                    .with_posting(Posting::blank("Income:Job")),
            ),
        ];
        let evaluation = evaluate(&directives);
        assert!(evaluation.errors.is_empty());
        evaluation.state
    }

    fn render(state: &LedgerState, operating: &[String], filter: Option<&str>) -> String {
        let mut out = Vec::new();
        print_balances(state, operating, filter, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_balances_sorted_with_zero_rows() {
        let output = render(&sample_state(), &["EUR".to_string()], None);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Assets:Bank"));
        assert!(lines[0].ends_with("79.50 EUR"));
        assert!(lines[1].starts_with("Equity:Opening-Balances"));
        assert!(lines[1].ends_with("0 EUR"));
        assert!(lines[2].starts_with("Income:Job"));
        assert!(lines[2].ends_with("-79.50 EUR"));
    }

    #[test]
    fn test_print_balances_filter() {
        let output = render(&sample_state(), &[], Some("Income"));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Income:Job"));
    }

    #[test]
    fn test_print_balances_untouched_account_hidden_without_operating_currency() {
        let output = render(&sample_state(), &[], None);
        assert!(!output.contains("Equity:Opening-Balances"));
    }

    #[test]
    fn test_print_balances_json() {
        let mut out = Vec::new();
        print_balances_json(&sample_state(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["Assets:Bank"]["EUR"], serde_json::json!("79.50"));
    }

    #[test]
    fn test_print_summary() {
        let mut out = Vec::new();
        print_summary(0, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No errors found"));

        let mut out = Vec::new();
        print_summary(2, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("2 errors"));
    }
}
