//! Totals derivation for daily cash forms.
//!
//! Derived fields are never trusted from client input: every mutation
//! path recomputes them from the line items and flat fields immediately
//! before persistence, so a stale derived value can never be read back.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::form::types::LineItem;

/// The derived aggregate fields of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of application line-item amounts.
    pub apps_total: Decimal,
    /// Sum of bank-collection line-item amounts.
    ///
    /// The legacy flat bank fields (mada/visa) are deliberately excluded;
    /// they are retained for historical records only.
    pub bank_total: Decimal,
    /// `cash_collection + apps_total + bank_total`.
    pub total_sales: Decimal,
}

/// Derives the aggregate totals from the current line items and flat fields.
///
/// Deterministic and infallible: missing amounts count as zero. Calling
/// this repeatedly on unchanged input yields identical totals.
#[must_use]
pub fn derive_totals(
    cash_collection: Decimal,
    applications: &[LineItem],
    bank_collections: &[LineItem],
) -> Totals {
    let apps_total: Decimal = applications.iter().map(LineItem::amount_or_zero).sum();
    let bank_total: Decimal = bank_collections.iter().map(LineItem::amount_or_zero).sum();

    Totals {
        apps_total,
        bank_total,
        total_sales: cash_collection + apps_total + bank_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, amount: Option<Decimal>) -> LineItem {
        LineItem {
            template_id: None,
            name: name.to_string(),
            amount,
        }
    }

    #[test]
    fn test_spec_scenario_totals() {
        let totals = derive_totals(
            dec!(100),
            &[item("A", Some(dec!(50)))],
            &[item("B", Some(dec!(30)))],
        );

        assert_eq!(totals.apps_total, dec!(50));
        assert_eq!(totals.bank_total, dec!(30));
        assert_eq!(totals.total_sales, dec!(180));
    }

    #[test]
    fn test_empty_collections() {
        let totals = derive_totals(dec!(75), &[], &[]);
        assert_eq!(totals.apps_total, Decimal::ZERO);
        assert_eq!(totals.bank_total, Decimal::ZERO);
        assert_eq!(totals.total_sales, dec!(75));
    }

    #[test]
    fn test_missing_amounts_count_as_zero() {
        let totals = derive_totals(
            dec!(10),
            &[item("A", None), item("B", Some(dec!(5)))],
            &[item("C", None)],
        );

        assert_eq!(totals.apps_total, dec!(5));
        assert_eq!(totals.bank_total, Decimal::ZERO);
        assert_eq!(totals.total_sales, dec!(15));
    }

    #[test]
    fn test_negative_amounts_are_summed() {
        let totals = derive_totals(
            dec!(100),
            &[item("Refund", Some(dec!(-20))), item("A", Some(dec!(50)))],
            &[],
        );

        assert_eq!(totals.apps_total, dec!(30));
        assert_eq!(totals.total_sales, dec!(130));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let apps = vec![item("A", Some(dec!(12.34))), item("B", Some(dec!(0.66)))];
        let bank = vec![item("C", Some(dec!(99.99)))];

        let first = derive_totals(dec!(50), &apps, &bank);
        let second = derive_totals(dec!(50), &apps, &bank);
        assert_eq!(first, second);
    }
}
