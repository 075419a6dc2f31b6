//! Property-based tests for totals derivation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::form::totals::derive_totals;
use crate::form::types::LineItem;

/// Strategy for generating random Decimal amounts, including negatives.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating a line item with an optional amount.
fn arb_line_item() -> impl Strategy<Value = LineItem> {
    (proptest::option::of(arb_amount()), "[a-zA-Z ]{1,16}").prop_map(|(amount, name)| LineItem {
        template_id: None,
        name,
        amount,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// apps_total and bank_total equal the sums of their collections,
    /// with missing amounts counted as zero.
    #[test]
    fn prop_totals_match_sums(
        cash in arb_amount(),
        apps in proptest::collection::vec(arb_line_item(), 0..12),
        bank in proptest::collection::vec(arb_line_item(), 0..12),
    ) {
        let totals = derive_totals(cash, &apps, &bank);

        let expected_apps: Decimal = apps.iter().map(LineItem::amount_or_zero).sum();
        let expected_bank: Decimal = bank.iter().map(LineItem::amount_or_zero).sum();

        prop_assert_eq!(totals.apps_total, expected_apps);
        prop_assert_eq!(totals.bank_total, expected_bank);
        prop_assert_eq!(totals.total_sales, cash + expected_apps + expected_bank);
    }

    /// Recomputing on unchanged input never drifts.
    #[test]
    fn prop_recompute_idempotent(
        cash in arb_amount(),
        apps in proptest::collection::vec(arb_line_item(), 0..12),
        bank in proptest::collection::vec(arb_line_item(), 0..12),
    ) {
        let first = derive_totals(cash, &apps, &bank);
        let second = derive_totals(cash, &apps, &bank);
        prop_assert_eq!(first, second);
    }
}
