//! In-memory store
//!
//! dashmap-backed implementation of the store traits. Used by the test
//! suite and available as a backend for ephemeral deployments.
//! `atomic_update` holds the item's shard write lock for the duration of
//! the closure, which serializes same-item updates exactly like a redb
//! write transaction does.

use dashmap::DashMap;
use shared::{CatalogItem, Credential, Order, OrderStatus};

use super::{AtomicUpdate, CredentialStore, ItemStore, OrderStore, StorageError, StorageResult};

/// Store backed by concurrent hash maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: DashMap<String, Credential>,
    items: DashMap<String, CatalogItem>,
    orders: DashMap<String, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn insert(&self, credential: &Credential) -> StorageResult<()> {
        use dashmap::mapref::entry::Entry;
        match self.credentials.entry(credential.username.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate(credential.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(credential.clone());
                Ok(())
            }
        }
    }

    fn find_by_username(&self, username: &str) -> StorageResult<Option<Credential>> {
        Ok(self.credentials.get(username).map(|c| c.clone()))
    }

    fn find_by_id(&self, id: &str) -> StorageResult<Option<Credential>> {
        Ok(self
            .credentials
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.clone()))
    }

    fn list(&self) -> StorageResult<Vec<Credential>> {
        let mut all: Vec<Credential> = self.credentials.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

impl ItemStore for MemoryStore {
    fn get(&self, id: &str) -> StorageResult<Option<CatalogItem>> {
        Ok(self.items.get(id).map(|i| i.clone()))
    }

    fn list(&self) -> StorageResult<Vec<CatalogItem>> {
        let mut all: Vec<CatalogItem> = self.items.iter().map(|i| i.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn put(&self, item: &CatalogItem) -> StorageResult<()> {
        self.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        Ok(self.items.remove(id).is_some())
    }

    fn atomic_update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut CatalogItem) -> bool,
    ) -> StorageResult<AtomicUpdate> {
        // get_mut pins the entry's write lock across the closure
        let Some(mut entry) = self.items.get_mut(id) else {
            return Ok(AtomicUpdate::Missing);
        };

        let mut candidate = entry.clone();
        if apply(&mut candidate) {
            *entry = candidate;
            Ok(AtomicUpdate::Committed)
        } else {
            Ok(AtomicUpdate::Aborted)
        }
    }
}

impl OrderStore for MemoryStore {
    fn insert(&self, order: &Order) -> StorageResult<()> {
        self.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<Order>> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    fn list(&self) -> StorageResult<Vec<Order>> {
        let mut all: Vec<Order> = self.orders.iter().map(|o| o.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn set_status(&self, id: &str, status: OrderStatus) -> StorageResult<Option<Order>> {
        match self.orders.get_mut(id) {
            Some(mut order) => {
                order.status = status;
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::{Category, Role};

    #[test]
    fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        let cred = Credential {
            id: "1".to_string(),
            username: "bob".to_string(),
            password_hash: "h".to_string(),
            role: Role::Cashier,
            created_at: Utc::now(),
        };
        CredentialStore::insert(&store, &cred).unwrap();
        assert!(matches!(
            CredentialStore::insert(&store, &cred),
            Err(StorageError::Duplicate(_))
        ));
    }

    #[test]
    fn test_atomic_update_abort_leaves_item_unchanged() {
        let store = MemoryStore::new();
        store
            .put(&CatalogItem {
                id: "a".to_string(),
                name: "Coffee".to_string(),
                category: Category::Drinks,
                price: Decimal::new(300, 2),
                available_quantity: 4,
                is_available: true,
                image_ref: None,
                created_at: Utc::now(),
            })
            .unwrap();

        let outcome = store
            .atomic_update("a", &mut |item| {
                item.available_quantity = 0;
                false
            })
            .unwrap();
        assert_eq!(outcome, AtomicUpdate::Aborted);
        assert_eq!(
            ItemStore::get(&store, "a").unwrap().unwrap().available_quantity,
            4
        );
    }
}
