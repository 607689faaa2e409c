//! Property tests for the stable chronological sort.

use beanbook_core::{
    sort_directives, Amount, Balance, Close, Directive, Open, Origin, Pad, Price, Transaction,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Build one directive of the given class, tagged with its input position
/// through the origin line number.
fn make_directive(kind: u8, day_offset: u8, index: usize) -> Directive {
    let date = base_date() + chrono::Days::new(u64::from(day_offset));
    let origin = Origin::new("prop.bean", index);
    match kind % 6 {
        0 => Directive::Open(Open::new(date, "Assets:Bank").with_origin(origin)),
        1 => Directive::Close(Close::new(date, "Assets:Bank").with_origin(origin)),
        2 => Directive::Pad(
            Pad::new(date, "Assets:Bank", "Equity:Opening-Balances").with_origin(origin),
        ),
        3 => Directive::Balance(
            Balance::new(date, "Assets:Bank", Amount::new(Decimal::ZERO, "USD"))
                .with_origin(origin),
        ),
        4 => Directive::Price(
            Price::new(date, "USD", Amount::new(Decimal::ONE, "EUR")).with_origin(origin),
        ),
        _ => Directive::Transaction(Transaction::new(date, "txn").with_origin(origin)),
    }
}

proptest! {
    /// The sort orders by (date, priority) and never reorders directives
    /// that compare equal on both keys.
    #[test]
    fn sort_is_stable_and_ordered(classes in proptest::collection::vec((0u8..6, 0u8..4), 0..40)) {
        let mut directives: Vec<Directive> = classes
            .iter()
            .enumerate()
            .map(|(i, &(kind, day))| make_directive(kind, day, i))
            .collect();

        sort_directives(&mut directives);

        for pair in directives.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key_a = (a.date(), a.priority());
            let key_b = (b.date(), b.priority());
            prop_assert!(key_a <= key_b, "sort keys out of order: {key_a:?} > {key_b:?}");
            if key_a == key_b {
                prop_assert!(
                    a.origin().line < b.origin().line,
                    "equal keys reordered: {} before {}",
                    a.origin().line,
                    b.origin().line
                );
            }
        }
    }
}
