//! Per-directive apply steps.
//!
//! Each apply receives the single mutable [`LedgerState`] and either
//! commits its whole effect or leaves the state untouched and reports one
//! [`EvalErrorKind`]. Transactions in particular run all of their checks
//! (blank-leg resolution, lifecycle, commodity constraints, lot matching)
//! before the first mutation.

use beanbook_core::{
    Amount, Balance, Close, CostSpec, Directive, Lot, Open, Pad, Posting, Price, Transaction,
};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::error::EvalErrorKind;
use crate::state::{Account, LedgerState, PricePoint};

/// Balance assertions pass within this distance of the asserted amount.
fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

pub(crate) fn apply_directive(
    state: &mut LedgerState,
    directive: &Directive,
) -> Result<(), EvalErrorKind> {
    match directive {
        Directive::Open(open) => apply_open(state, open),
        Directive::Close(close) => apply_close(state, close),
        Directive::Balance(balance) => apply_balance(state, balance),
        Directive::Pad(pad) => apply_pad(state, pad),
        Directive::Price(price) => apply_price(state, price),
        Directive::Transaction(txn) => apply_transaction(state, txn),
    }
}

fn apply_open(state: &mut LedgerState, open: &Open) -> Result<(), EvalErrorKind> {
    match state.accounts.get_mut(&open.account) {
        None => {
            state.accounts.insert(
                open.account.clone(),
                Account::new(&open.account, open.currencies.iter().cloned(), open.date),
            );
            state.balances.entry(open.account.clone()).or_default();
            state.inventories.entry(open.account.clone()).or_default();
            Ok(())
        }
        Some(account) => {
            if account.is_open(open.date) {
                return Err(EvalErrorKind::AlreadyOpen(open.account.clone()));
            }
            // Reopening is only allowed with the identical commodity set,
            // spelled out again.
            let reopened: HashSet<String> = open.currencies.iter().cloned().collect();
            if reopened.is_empty() || reopened != account.currencies {
                return Err(EvalErrorKind::CurrencyChange(open.account.clone()));
            }
            account.opened.push(open.date);
            Ok(())
        }
    }
}

fn apply_close(state: &mut LedgerState, close: &Close) -> Result<(), EvalErrorKind> {
    let account = state
        .accounts
        .get_mut(&close.account)
        .ok_or_else(|| EvalErrorKind::UnknownAccount(close.account.clone()))?;
    if account.closed.len() >= account.opened.len() {
        return Err(EvalErrorKind::AlreadyClosed(close.account.clone()));
    }
    account.closed.push(close.date);
    Ok(())
}

fn apply_price(state: &mut LedgerState, price: &Price) -> Result<(), EvalErrorKind> {
    state
        .prices
        .entry(price.currency.clone())
        .or_default()
        .push(PricePoint {
            date: price.date,
            amount: price.amount.clone(),
        });
    Ok(())
}

fn apply_pad(state: &mut LedgerState, pad: &Pad) -> Result<(), EvalErrorKind> {
    match state.accounts.get(&pad.source_account) {
        None => return Err(EvalErrorKind::UnknownAccount(pad.source_account.clone())),
        Some(source) if source.is_closed(pad.date) => {
            return Err(EvalErrorKind::AccountClosed(pad.source_account.clone()));
        }
        Some(_) => {}
    }
    let account = state
        .accounts
        .get_mut(&pad.account)
        .ok_or_else(|| EvalErrorKind::UnknownAccount(pad.account.clone()))?;
    if account.is_closed(pad.date) {
        return Err(EvalErrorKind::AccountClosed(pad.account.clone()));
    }
    // The new pad is attached either way; replacing an unconsumed one is
    // still reported.
    let previous = account.pad.replace(pad.clone());
    if previous.is_some() {
        return Err(EvalErrorKind::UnusedPad(pad.account.clone()));
    }
    Ok(())
}

fn apply_balance(state: &mut LedgerState, balance: &Balance) -> Result<(), EvalErrorKind> {
    if !state.accounts.contains_key(&balance.account) {
        return Err(EvalErrorKind::UnknownAccount(balance.account.clone()));
    }
    let calculated = state.balance(&balance.account, &balance.amount.currency);
    if (calculated - balance.amount.number).abs() < balance_tolerance() {
        return Ok(());
    }

    let pad = state
        .accounts
        .get(&balance.account)
        .and_then(|account| account.pad.clone());
    let Some(pad) = pad else {
        return Err(EvalErrorKind::BalanceMismatch {
            account: balance.account.clone(),
            expected: balance.amount.clone(),
            calculated,
        });
    };

    let padding = padding_transaction(&pad, balance, calculated);
    apply_transaction(state, &padding)?;
    if state.balance(&balance.account, &balance.amount.currency) != balance.amount.number {
        return Err(EvalErrorKind::PadFailed(balance.account.clone()));
    }
    if let Some(account) = state.accounts.get_mut(&balance.account) {
        account.pad = None;
    }
    Ok(())
}

/// The transaction a consumed pad inserts, dated at the pad itself.
fn padding_transaction(pad: &Pad, balance: &Balance, calculated: Decimal) -> Transaction {
    let amount = Amount::new(
        balance.amount.number - calculated,
        balance.amount.currency.clone(),
    );
    Transaction::new(
        pad.date,
        format!(
            "Padding inserted for balance of {} for difference {}",
            balance.amount, amount
        ),
    )
    .with_flag('P')
    .with_origin(pad.origin.clone())
    .with_posting(Posting::new(pad.account.clone(), amount.clone()))
    .with_posting(Posting::new(pad.source_account.clone(), -amount))
}

fn apply_transaction(state: &mut LedgerState, txn: &Transaction) -> Result<(), EvalErrorKind> {
    // Step 1: effective contributions per effective commodity, and the
    // blank leg if there is one.
    let mut blank: Option<usize> = None;
    let mut sums: Vec<(String, Decimal)> = Vec::new();
    for (i, posting) in txn.postings.iter().enumerate() {
        let Some(units) = &posting.units else {
            if blank.is_some() {
                return Err(EvalErrorKind::MultipleBlankPostings);
            }
            blank = Some(i);
            continue;
        };
        let (value, currency) = effective_contribution(state, posting, units)?;
        match sums.iter_mut().find(|(c, _)| *c == currency) {
            Some((_, sum)) => *sum += value,
            None => sums.push((currency, value)),
        }
    }

    let mut amounts: Vec<Amount> = txn
        .postings
        .iter()
        .map(|p| p.units.clone().unwrap_or_else(|| Amount::zero("")))
        .collect();
    if let Some(i) = blank {
        if sums.len() > 1 {
            return Err(EvalErrorKind::MixedCommodities);
        }
        let Some((currency, sum)) = sums.first() else {
            return Err(EvalErrorKind::UnresolvedBlank);
        };
        amounts[i] = Amount::new(-*sum, currency.clone());
    } else if let Some((currency, residual)) =
        sums.iter().find(|(_, sum)| !sum.is_zero())
    {
        return Err(EvalErrorKind::Unbalanced {
            currency: currency.clone(),
            residual: *residual,
        });
    }

    // Step 2: lifecycle and commodity pre-checks, before any mutation.
    for (posting, units) in txn.postings.iter().zip(&amounts) {
        let account = state
            .accounts
            .get(&posting.account)
            .ok_or_else(|| EvalErrorKind::UnknownAccount(posting.account.clone()))?;
        if !account.is_open(txn.date) {
            return Err(EvalErrorKind::NotOpen(posting.account.clone()));
        }
        if !account.currency_allowed(&units.currency) {
            return Err(EvalErrorKind::CurrencyNotAllowed {
                account: posting.account.clone(),
                currency: units.currency.clone(),
            });
        }
    }

    // Step 3: commit.
    for (posting, units) in txn.postings.iter().zip(&amounts) {
        if let Some(account) = state.accounts.get_mut(&posting.account) {
            account.had_transactions = true;
        }
        match &posting.cost {
            Some(CostSpec::PerUnit(cost)) => {
                state
                    .inventories
                    .entry(posting.account.clone())
                    .or_default()
                    .entry(units.currency.clone())
                    .or_default()
                    .push(Lot::new(units.clone(), cost.clone(), txn.date));
            }
            Some(CostSpec::Implicit) => {
                if let Some(buckets) = state.inventories.get_mut(&posting.account) {
                    buckets.remove(&units.currency);
                }
            }
            None => {}
        }
        *state
            .balances
            .entry(posting.account.clone())
            .or_default()
            .entry(units.currency.clone())
            .or_default() += units.number;
    }
    Ok(())
}

/// What a posting contributes to the balancing sum, and in which commodity.
fn effective_contribution(
    state: &LedgerState,
    posting: &Posting,
    units: &Amount,
) -> Result<(Decimal, String), EvalErrorKind> {
    if let Some(price) = &posting.price {
        return Ok((units.number * price.number, price.currency.clone()));
    }
    match &posting.cost {
        Some(CostSpec::PerUnit(cost)) => Ok((units.number * cost.number, cost.currency.clone())),
        Some(CostSpec::Implicit) => {
            let lots = state.lots(&posting.account, &units.currency);
            if lots.is_empty() {
                return Err(EvalErrorKind::NoLots {
                    account: posting.account.clone(),
                    currency: units.currency.clone(),
                });
            }
            let held: Decimal = lots.iter().map(|lot| lot.units.number).sum();
            if held != -units.number {
                return Err(EvalErrorKind::LotMismatch {
                    account: posting.account.clone(),
                    currency: units.currency.clone(),
                    held,
                    required: -units.number,
                });
            }
            let book_value: Decimal = lots
                .iter()
                .map(|lot| lot.units.number * lot.cost.number)
                .sum();
            Ok((-book_value, lots[0].cost.currency.clone()))
        }
        None => Ok((units.number, units.currency.clone())),
    }
}
