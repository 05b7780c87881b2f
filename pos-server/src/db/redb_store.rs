//! redb-backed store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `credentials` | username | JSON `Credential` |
//! | `items` | item id | JSON `CatalogItem` |
//! | `orders` | order id | JSON `Order` |
//!
//! Values are JSON-serialized; redb write transactions are serialized
//! against each other, which is what gives `atomic_update` its
//! no-interleaving guarantee. Commits are durable when `commit()`
//! returns (copy-on-write with atomic pointer swap), so a power cut
//! never leaves the database torn between a stock decrement and its
//! order.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::{CatalogItem, Credential, Order, OrderStatus};

use super::{AtomicUpdate, CredentialStore, ItemStore, OrderStore, StorageResult};

const CREDENTIALS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");
const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("items");
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Store backed by an embedded redb database
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(db)
    }

    /// Open an in-memory database (tests, ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(db)
    }

    fn init_tables(db: Database) -> StorageResult<Self> {
        // Create all tables up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn read_one<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn read_all<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    fn write_one<T: serde::Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let serialized = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            table.insert(key, serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl CredentialStore for RedbStore {
    fn insert(&self, credential: &Credential) -> StorageResult<()> {
        let serialized = serde_json::to_vec(credential)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS_TABLE)?;
            if table.get(credential.username.as_str())?.is_some() {
                return Err(super::StorageError::Duplicate(credential.username.clone()));
            }
            table.insert(credential.username.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find_by_username(&self, username: &str) -> StorageResult<Option<Credential>> {
        self.read_one(CREDENTIALS_TABLE, username)
    }

    fn find_by_id(&self, id: &str) -> StorageResult<Option<Credential>> {
        // Credentials are keyed by username; id lookups scan. The
        // credential table is small (staff accounts), so no index table.
        let all: Vec<Credential> = self.read_all(CREDENTIALS_TABLE)?;
        Ok(all.into_iter().find(|c| c.id == id))
    }

    fn list(&self) -> StorageResult<Vec<Credential>> {
        let mut all: Vec<Credential> = self.read_all(CREDENTIALS_TABLE)?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

impl ItemStore for RedbStore {
    fn get(&self, id: &str) -> StorageResult<Option<CatalogItem>> {
        self.read_one(ITEMS_TABLE, id)
    }

    fn list(&self) -> StorageResult<Vec<CatalogItem>> {
        let mut all: Vec<CatalogItem> = self.read_all(ITEMS_TABLE)?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn put(&self, item: &CatalogItem) -> StorageResult<()> {
        self.write_one(ITEMS_TABLE, &item.id, item)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ITEMS_TABLE)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn atomic_update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut CatalogItem) -> bool,
    ) -> StorageResult<AtomicUpdate> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(ITEMS_TABLE)?;
            let current: Option<CatalogItem> = match table.get(id)? {
                Some(guard) => Some(serde_json::from_slice(guard.value())?),
                None => None,
            };
            match current {
                None => AtomicUpdate::Missing,
                Some(mut item) => {
                    if apply(&mut item) {
                        let serialized = serde_json::to_vec(&item)?;
                        table.insert(id, serialized.as_slice())?;
                        AtomicUpdate::Committed
                    } else {
                        AtomicUpdate::Aborted
                    }
                }
            }
        };
        match outcome {
            AtomicUpdate::Committed => write_txn.commit()?,
            // Nothing written; drop the transaction without touching disk
            AtomicUpdate::Aborted | AtomicUpdate::Missing => write_txn.abort()?,
        }
        Ok(outcome)
    }
}

impl OrderStore for RedbStore {
    fn insert(&self, order: &Order) -> StorageResult<()> {
        self.write_one(ORDERS_TABLE, &order.id, order)
    }

    fn get(&self, id: &str) -> StorageResult<Option<Order>> {
        self.read_one(ORDERS_TABLE, id)
    }

    fn list(&self) -> StorageResult<Vec<Order>> {
        let mut all: Vec<Order> = self.read_all(ORDERS_TABLE)?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn set_status(&self, id: &str, status: OrderStatus) -> StorageResult<Option<Order>> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let current: Option<Order> = match table.get(id)? {
                Some(guard) => Some(serde_json::from_slice(guard.value())?),
                None => None,
            };
            match current {
                None => None,
                Some(mut order) => {
                    order.status = status;
                    let serialized = serde_json::to_vec(&order)?;
                    table.insert(id, serialized.as_slice())?;
                    Some(order)
                }
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }
}
