//! Line-item resolution against report templates.
//!
//! Client submissions reference templates by id. Resolution snapshots the
//! template's canonical name into the persisted item; a reference that does
//! not resolve falls back to the submitted free-text name, and a draft with
//! neither is dropped silently. Input order is preserved.

use std::collections::HashMap;

use cashdesk_shared::types::TemplateId;

use crate::form::types::{LineItem, LineItemDraft, LineItemGroup, Template};

/// Converts submitted drafts into persisted line items for one group.
///
/// `templates` is the batched lookup result supplied by the caller; only
/// entries that are active and belong to `group` are honored, so a stale
/// or wrong-group reference degrades to the free-text fallback.
#[must_use]
pub fn resolve_line_items(
    drafts: &[LineItemDraft],
    templates: &[Template],
    group: LineItemGroup,
) -> Vec<LineItem> {
    let by_id: HashMap<TemplateId, &Template> = templates
        .iter()
        .filter(|t| t.is_active && t.group == group)
        .map(|t| (t.id, t))
        .collect();

    drafts
        .iter()
        .filter_map(|draft| {
            if let Some(template) = draft.template_id.and_then(|id| by_id.get(&id)) {
                return Some(LineItem {
                    template_id: Some(template.id),
                    name: template.name.clone(),
                    amount: draft.amount,
                });
            }

            let name = draft.name.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                // Neither a resolving template nor a usable name.
                return None;
            }

            Some(LineItem {
                template_id: None,
                name: name.to_string(),
                amount: draft.amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn template(name: &str, group: LineItemGroup, is_active: bool) -> Template {
        Template {
            id: TemplateId::new(),
            name: name.to_string(),
            group,
            is_active,
        }
    }

    fn draft(
        template_id: Option<TemplateId>,
        name: Option<&str>,
        amount: Option<rust_decimal::Decimal>,
    ) -> LineItemDraft {
        LineItemDraft {
            template_id,
            name: name.map(str::to_string),
            amount,
        }
    }

    #[test]
    fn test_resolving_template_snapshots_name() {
        let tmpl = template("HungerStation", LineItemGroup::Applications, true);
        let drafts = vec![draft(Some(tmpl.id), Some("ignored"), Some(dec!(50)))];

        let items = resolve_line_items(&drafts, &[tmpl.clone()], LineItemGroup::Applications);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].template_id, Some(tmpl.id));
        assert_eq!(items[0].name, "HungerStation");
        assert_eq!(items[0].amount, Some(dec!(50)));
    }

    #[test]
    fn test_inactive_template_falls_back_to_free_text() {
        let tmpl = template("Jahez", LineItemGroup::Applications, false);
        let drafts = vec![draft(Some(tmpl.id), Some("Jahez manual"), Some(dec!(10)))];

        let items = resolve_line_items(&drafts, &[tmpl], LineItemGroup::Applications);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].template_id, None);
        assert_eq!(items[0].name, "Jahez manual");
    }

    #[test]
    fn test_wrong_group_template_falls_back() {
        let tmpl = template("Mada", LineItemGroup::Bank, true);
        let drafts = vec![draft(Some(tmpl.id), Some("Mada"), Some(dec!(5)))];

        let items = resolve_line_items(&drafts, &[tmpl], LineItemGroup::Applications);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].template_id, None);
    }

    #[test]
    fn test_unresolvable_without_name_is_dropped() {
        let drafts = vec![
            draft(Some(TemplateId::new()), None, Some(dec!(5))),
            draft(None, Some("   "), Some(dec!(7))),
            draft(None, None, None),
        ];

        let items = resolve_line_items(&drafts, &[], LineItemGroup::Bank);
        assert!(items.is_empty());
    }

    #[test]
    fn test_input_order_is_preserved() {
        let first = template("First", LineItemGroup::Bank, true);
        let third = template("Third", LineItemGroup::Bank, true);
        let drafts = vec![
            draft(Some(first.id), None, Some(dec!(1))),
            draft(None, Some("Second"), Some(dec!(2))),
            draft(Some(third.id), None, Some(dec!(3))),
        ];

        let items = resolve_line_items(&drafts, &[first, third], LineItemGroup::Bank);

        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_free_text_name_is_trimmed() {
        let drafts = vec![draft(None, Some("  Walk-in  "), None)];
        let items = resolve_line_items(&drafts, &[], LineItemGroup::Applications);
        assert_eq!(items[0].name, "Walk-in");
    }
}
