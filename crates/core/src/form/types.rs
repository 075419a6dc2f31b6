//! Form domain types: line items, groups, and templates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use cashdesk_shared::types::TemplateId;

/// Group a template or line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemGroup {
    /// Delivery/payment application collections.
    Applications,
    /// Bank collections (card terminals, transfers).
    Bank,
}

impl LineItemGroup {
    /// Returns the string representation of the group.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Bank => "bank",
        }
    }

    /// Parses a group from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "applications" => Some(Self::Applications),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }
}

impl fmt::Display for LineItemGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named monetary entry within a form's line-item collections.
///
/// The name is a value snapshot taken from the template at write time,
/// never a live reference: renaming or deactivating a template later
/// must not change historical forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The template this item was resolved from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    /// Display name, denormalized from the template or free text.
    pub name: String,
    /// Submitted amount. `None` counts as zero in totals.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl LineItem {
    /// Returns the amount, treating a missing value as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// A client-submitted line item before template resolution.
///
/// Every field is optional; resolution decides whether the draft becomes
/// a template-backed item, a free-text item, or is dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemDraft {
    /// Reference to a template, resolved against the active set.
    pub template_id: Option<TemplateId>,
    /// Free-text fallback name.
    pub name: Option<String>,
    /// Submitted amount.
    pub amount: Option<Decimal>,
}

/// A reusable named line-item definition, scoped to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Unique identifier.
    pub id: TemplateId,
    /// Canonical display name, copied into line items at write time.
    pub name: String,
    /// Which collection this template feeds.
    pub group: LineItemGroup,
    /// Inactive templates are ignored during resolution.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_parse() {
        assert_eq!(
            LineItemGroup::parse("applications"),
            Some(LineItemGroup::Applications)
        );
        assert_eq!(LineItemGroup::parse("BANK"), Some(LineItemGroup::Bank));
        assert_eq!(LineItemGroup::parse("cash"), None);
    }

    #[test]
    fn test_amount_or_zero() {
        let item = LineItem {
            template_id: None,
            name: "Walk-in".to_string(),
            amount: None,
        };
        assert_eq!(item.amount_or_zero(), Decimal::ZERO);

        let item = LineItem {
            amount: Some(dec!(12.50)),
            ..item
        };
        assert_eq!(item.amount_or_zero(), dec!(12.50));
    }
}
