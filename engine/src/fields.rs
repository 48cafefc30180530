//! Field-level diffing for items.
//!
//! A single field table drives both change detection and field-level merge
//! application, so every field the differ can report is also mergeable.
//! Fields outside the table are invisible to both steps even when they
//! changed.

use crate::conflict::FieldChange;
use crate::record::Item;

/// A diffable item field.
///
/// One variant per field the engine understands. The wire name is what
/// appears in [`FieldChange`] and in merge resolutions; the display name is
/// what the review UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Name,
    PurchasePrice,
    Quantity,
    LocationId,
}

impl ItemField {
    /// Every diffable field, in report order.
    pub const ALL: [ItemField; 4] = [
        ItemField::Name,
        ItemField::PurchasePrice,
        ItemField::Quantity,
        ItemField::LocationId,
    ];

    /// Wire name used in field changes and merge resolutions.
    pub fn field_name(&self) -> &'static str {
        match self {
            ItemField::Name => "name",
            ItemField::PurchasePrice => "purchasePrice",
            ItemField::Quantity => "quantity",
            ItemField::LocationId => "locationId",
        }
    }

    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemField::Name => "Name",
            ItemField::PurchasePrice => "Purchase Price",
            ItemField::Quantity => "Quantity",
            ItemField::LocationId => "Location",
        }
    }

    /// Look up a field by its wire name.
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.field_name() == name)
    }

    /// Render the field's value as a display string, `None` when unset.
    pub fn render(&self, item: &Item) -> Option<String> {
        match self {
            ItemField::Name => Some(item.name.clone()),
            ItemField::PurchasePrice => item.purchase_price.map(|p| p.to_string()),
            ItemField::Quantity => Some(item.quantity.to_string()),
            ItemField::LocationId => item.location_id.map(|id| id.to_string()),
        }
    }

    /// Copy this field's value from `src` into `dst`.
    pub fn copy_from(&self, dst: &mut Item, src: &Item) {
        match self {
            ItemField::Name => dst.name = src.name.clone(),
            ItemField::PurchasePrice => dst.purchase_price = src.purchase_price,
            ItemField::Quantity => dst.quantity = src.quantity,
            ItemField::LocationId => dst.location_id = src.location_id,
        }
    }
}

/// Compare two item versions field by field.
///
/// Every differing field yields one change marked conflicting; the design
/// has no notion of a non-conflicting change.
pub fn diff_items(old: &Item, new: &Item) -> Vec<FieldChange> {
    ItemField::ALL
        .iter()
        .filter_map(|field| {
            let old_value = field.render(old);
            let new_value = field.render(new);
            if old_value == new_value {
                return None;
            }
            Some(FieldChange {
                field_name: field.field_name().to_string(),
                display_name: field.display_name().to_string(),
                old_value,
                new_value,
                is_conflicting: true,
            })
        })
        .collect()
}
