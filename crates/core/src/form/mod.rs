//! Daily cash form domain logic.
//!
//! A form is a branch's daily financial submission: flat monetary fields,
//! two ordered line-item collections (applications and bank collections),
//! and the derived totals recomputed on every mutation.

pub mod line_items;
pub mod totals;
pub mod types;

#[cfg(test)]
mod totals_props;

pub use line_items::resolve_line_items;
pub use totals::{Totals, derive_totals};
pub use types::{LineItem, LineItemDraft, LineItemGroup, Template};
