//! Repository seam - the engine's only persistence side effect.
//!
//! One trait per record kind, each with a single `save`. The engine calls
//! `save` exactly once per successful resolution, after the resolved payload
//! has been decoded back into a typed record. Real backends (SQLite, remote
//! API) live outside this crate; the in-memory implementations here back
//! tests and prototypes.

use crate::error::{Error, Result};
use crate::record::{Item, Location, Receipt};
use crate::EntityId;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence for items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn save(&self, item: Item) -> Result<()>;
}

/// Persistence for receipts.
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    async fn save(&self, receipt: Receipt) -> Result<()>;
}

/// Persistence for locations.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn save(&self, location: Location) -> Result<()>;
}

/// In-memory item store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: RwLock<HashMap<EntityId, Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a saved item by id.
    pub async fn get(&self, id: EntityId) -> Option<Item> {
        self.items.read().await.get(&id).cloned()
    }

    /// Number of saved items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn save(&self, item: Item) -> Result<()> {
        self.items.write().await.insert(item.id, item);
        Ok(())
    }
}

/// In-memory receipt store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryReceiptRepository {
    receipts: RwLock<HashMap<EntityId, Receipt>>,
}

impl InMemoryReceiptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: EntityId) -> Option<Receipt> {
        self.receipts.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.receipts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.receipts.read().await.is_empty()
    }
}

#[async_trait]
impl ReceiptRepository for InMemoryReceiptRepository {
    async fn save(&self, receipt: Receipt) -> Result<()> {
        self.receipts.write().await.insert(receipt.id, receipt);
        Ok(())
    }
}

/// In-memory location store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryLocationRepository {
    locations: RwLock<HashMap<EntityId, Location>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: EntityId) -> Option<Location> {
        self.locations.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.locations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locations.read().await.is_empty()
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn save(&self, location: Location) -> Result<()> {
        self.locations.write().await.insert(location.id, location);
        Ok(())
    }
}

/// Item repository that rejects every save. Test double for persistence
/// failure paths.
#[derive(Debug, Default)]
pub struct FailingItemRepository;

#[async_trait]
impl ItemRepository for FailingItemRepository {
    async fn save(&self, _item: Item) -> Result<()> {
        Err(Error::ResolutionFailed("repository unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_get_item() {
        let repo = InMemoryItemRepository::new();
        let item = Item::new("Laptop", 1000);
        let id = item.id;

        repo.save(item.clone()).await.unwrap();

        assert_eq!(repo.get(id).await, Some(item));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn save_overwrites_same_id() {
        let repo = InMemoryItemRepository::new();
        let mut item = Item::new("Laptop", 1000);
        let id = item.id;

        repo.save(item.clone()).await.unwrap();
        item.name = "Laptop Pro".into();
        repo.save(item).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.get(id).await.unwrap().name, "Laptop Pro");
    }

    #[tokio::test]
    async fn failing_repository_rejects_saves() {
        let repo = FailingItemRepository;
        let result = repo.save(Item::new("Laptop", 1000)).await;

        assert!(matches!(result, Err(Error::ResolutionFailed(_))));
    }
}
