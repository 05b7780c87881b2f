//! Item stock ledger
//!
//! Authoritative view of per-item available quantity. All stock
//! movements go through here: settlement decrements and restocks.
//! Atomicity comes from the injected store's `atomic_update` - the
//! check-and-subtract runs while no other update to the same item can
//! interleave, so quantity can never be driven below zero by a race.

use std::sync::Arc;

use crate::db::{AtomicUpdate, ItemStore, StorageError};

/// Stock movement failure
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: String,
        requested: u32,
        available: u32,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Per-item stock ledger over an injected item store
#[derive(Clone)]
pub struct StockLedger {
    items: Arc<dyn ItemStore>,
}

impl StockLedger {
    pub fn new(items: Arc<dyn ItemStore>) -> Self {
        Self { items }
    }

    /// Current available quantity for an item
    pub fn get_available(&self, item_id: &str) -> Result<u32, StockError> {
        let item = self
            .items
            .get(item_id)?
            .ok_or_else(|| StockError::ItemNotFound(item_id.to_string()))?;
        Ok(item.available_quantity)
    }

    /// Atomically check `available >= quantity` and subtract
    ///
    /// On shortfall the ledger is left unchanged and the error reports
    /// the quantity that was available at decision time.
    pub fn reserve_decrement(&self, item_id: &str, quantity: u32) -> Result<(), StockError> {
        let mut available = 0u32;
        let outcome = self.items.atomic_update(item_id, &mut |item| {
            available = item.available_quantity;
            if item.available_quantity >= quantity {
                item.available_quantity -= quantity;
                true
            } else {
                false
            }
        })?;

        match outcome {
            AtomicUpdate::Committed => {
                tracing::debug!(item_id, quantity, remaining = available - quantity, "stock reserved");
                Ok(())
            }
            AtomicUpdate::Aborted => Err(StockError::InsufficientStock {
                item_id: item_id.to_string(),
                requested: quantity,
                available,
            }),
            AtomicUpdate::Missing => Err(StockError::ItemNotFound(item_id.to_string())),
        }
    }

    /// Additive restock; no upper bound beyond the counter's range
    pub fn restock(&self, item_id: &str, delta: u32) -> Result<u32, StockError> {
        let mut new_quantity = 0u32;
        let outcome = self.items.atomic_update(item_id, &mut |item| {
            item.available_quantity = item.available_quantity.saturating_add(delta);
            new_quantity = item.available_quantity;
            true
        })?;

        match outcome {
            AtomicUpdate::Committed => {
                tracing::debug!(item_id, delta, new_quantity, "stock added");
                Ok(new_quantity)
            }
            AtomicUpdate::Missing => Err(StockError::ItemNotFound(item_id.to_string())),
            // The restock closure always commits
            AtomicUpdate::Aborted => unreachable!("restock closure never aborts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::{CatalogItem, Category};

    fn ledger_with_item(quantity: u32) -> StockLedger {
        let store = Arc::new(MemoryStore::new());
        store
            .put(&CatalogItem {
                id: "a".to_string(),
                name: "Pancakes".to_string(),
                category: Category::Breakfast,
                price: Decimal::new(650, 2),
                available_quantity: quantity,
                is_available: true,
                image_ref: None,
                created_at: Utc::now(),
            })
            .unwrap();
        StockLedger::new(store)
    }

    #[test]
    fn test_reserve_and_get() {
        let ledger = ledger_with_item(5);
        ledger.reserve_decrement("a", 3).unwrap();
        assert_eq!(ledger.get_available("a").unwrap(), 2);
    }

    #[test]
    fn test_insufficient_stock_leaves_ledger_unchanged() {
        let ledger = ledger_with_item(2);
        let err = ledger.reserve_decrement("a", 3).unwrap_err();
        match err {
            StockError::InsufficientStock {
                item_id,
                requested,
                available,
            } => {
                assert_eq!(item_id, "a");
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(ledger.get_available("a").unwrap(), 2);
    }

    #[test]
    fn test_unknown_item() {
        let ledger = ledger_with_item(2);
        assert!(matches!(
            ledger.reserve_decrement("ghost", 1),
            Err(StockError::ItemNotFound(_))
        ));
        assert!(matches!(
            ledger.get_available("ghost"),
            Err(StockError::ItemNotFound(_))
        ));
        assert!(matches!(
            ledger.restock("ghost", 1),
            Err(StockError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_restock_then_reserve_round_trips() {
        let ledger = ledger_with_item(2);
        assert_eq!(ledger.restock("a", 4).unwrap(), 6);
        ledger.reserve_decrement("a", 4).unwrap();
        assert_eq!(ledger.get_available("a").unwrap(), 2);
    }

    #[test]
    fn test_concurrent_decrements_never_oversell() {
        let ledger = ledger_with_item(50);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                let mut successes = 0u32;
                // 10 attempts per thread, 100 total against stock of 50
                for _ in 0..10 {
                    if ledger.reserve_decrement("a", 1).is_ok() {
                        successes += 1;
                    }
                }
                successes
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(ledger.get_available("a").unwrap(), 0);
    }
}
