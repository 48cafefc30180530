//! Typed records for the inventory domain.
//!
//! Every record carries a stable id and a last-modified timestamp; detection
//! compares the timestamps of same-id records across the local and remote
//! sides. Items additionally expose the fields the differ knows how to
//! compare (see [`crate::fields`]).

use crate::error::Error;
use crate::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of record a conflict refers to.
///
/// Closed set: adding a kind is a compile-time-checked change everywhere the
/// engine dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Receipt,
    Location,
}

impl EntityKind {
    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Item => "Item",
            EntityKind::Receipt => "Receipt",
            EntityKind::Location => "Location",
        }
    }

    /// Symbol name the host UI shows next to this kind.
    pub fn icon(&self) -> &'static str {
        match self {
            EntityKind::Item => "shippingbox",
            EntityKind::Receipt => "doc.text",
            EntityKind::Location => "location",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Item => write!(f, "item"),
            EntityKind::Receipt => write!(f, "receipt"),
            EntityKind::Location => write!(f, "location"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(EntityKind::Item),
            "receipt" => Ok(EntityKind::Receipt),
            "location" => Ok(EntityKind::Location),
            other => Err(Error::UnsupportedEntityKind(other.to_string())),
        }
    }
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier for this item
    pub id: EntityId,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i64,
    pub purchase_price: Option<f64>,
    /// Storage location this item lives in
    pub location_id: Option<EntityId>,
    pub notes: Option<String>,
    /// When the item was first created (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the item was last modified (milliseconds since epoch)
    pub modified_at: Timestamp,
}

impl Item {
    /// Create a new item with a fresh id.
    pub fn new(name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: None,
            quantity: 1,
            purchase_price: None,
            location_id: None,
            notes: None,
            created_at: timestamp,
            modified_at: timestamp,
        }
    }
}

/// A purchase receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: EntityId,
    pub store_name: String,
    pub total_amount: f64,
    pub currency: String,
    pub purchase_date: Timestamp,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl Receipt {
    /// Create a new receipt with a fresh id.
    pub fn new(store_name: impl Into<String>, total_amount: f64, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_name: store_name.into(),
            total_amount,
            currency: "USD".into(),
            purchase_date: timestamp,
            created_at: timestamp,
            modified_at: timestamp,
        }
    }
}

/// A storage location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: EntityId,
    pub name: String,
    pub icon: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl Location {
    /// Create a new location with a fresh id.
    pub fn new(name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: None,
            notes: None,
            created_at: timestamp,
            modified_at: timestamp,
        }
    }
}

/// One side's already-fetched records, grouped by kind.
///
/// Detection takes two of these, one local and one remote. The sync layer
/// that fetches them is out of scope for the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub items: Vec<Item>,
    pub receipts: Vec<Receipt>,
    pub locations: Vec<Location>,
}

impl RecordSet {
    /// Create an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set the items.
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Builder-style method to set the receipts.
    pub fn with_receipts(mut self, receipts: Vec<Receipt>) -> Self {
        self.receipts = receipts;
        self
    }

    /// Builder-style method to set the locations.
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.items.len() + self.receipts.len() + self.locations.len()
    }

    /// Check whether the set holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_item() {
        let item = Item::new("Laptop", 1000);

        assert_eq!(item.name, "Laptop");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.created_at, 1000);
        assert_eq!(item.modified_at, 1000);
        assert!(item.purchase_price.is_none());
        assert!(item.location_id.is_none());
    }

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::Item.to_string(), "item");
        assert_eq!(EntityKind::Receipt.to_string(), "receipt");
        assert_eq!(EntityKind::Location.to_string(), "location");

        assert_eq!(EntityKind::Item.display_name(), "Item");
        assert_eq!(EntityKind::Location.icon(), "location");
    }

    #[test]
    fn entity_kind_from_str() {
        assert_eq!("item".parse::<EntityKind>().unwrap(), EntityKind::Item);
        assert_eq!(
            "receipt".parse::<EntityKind>().unwrap(),
            EntityKind::Receipt
        );

        let err = "warranty".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, Error::UnsupportedEntityKind("warranty".into()));
    }

    #[test]
    fn record_set_builder() {
        let set = RecordSet::new()
            .with_items(vec![Item::new("Laptop", 1000)])
            .with_locations(vec![Location::new("Garage", 1000)]);

        assert_eq!(set.items.len(), 1);
        assert_eq!(set.receipts.len(), 0);
        assert_eq!(set.locations.len(), 1);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(RecordSet::new().is_empty());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut item = Item::new("Laptop", 1000);
        item.purchase_price = Some(1299.99);
        item.brand = Some("Acme".into());

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("purchasePrice"));
        assert!(json.contains("modifiedAt"));

        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, parsed);
    }
}
