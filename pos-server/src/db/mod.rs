//! Persistence layer
//!
//! Storage is a capability injected into the rest of the server, not an
//! ambient handle: the ledger, the settlement engine and the handlers
//! all hold `Arc<dyn ...Store>` seams. Two implementations exist:
//!
//! - [`RedbStore`] - embedded redb database, the production backend
//! - [`MemoryStore`] - dashmap-backed, for tests and ephemeral runs

pub mod memory;
pub mod redb_store;

use shared::{CatalogItem, Credential, Order, OrderStatus};

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Result of an atomic read-modify-write on one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicUpdate {
    /// Closure approved the change and it was persisted
    Committed,
    /// Closure declined; nothing was written
    Aborted,
    /// No item under that id
    Missing,
}

/// Credential storage
///
/// `insert` enforces the username-uniqueness invariant and fails with
/// [`StorageError::Duplicate`] on collision.
pub trait CredentialStore: Send + Sync + 'static {
    fn insert(&self, credential: &Credential) -> StorageResult<()>;
    fn find_by_username(&self, username: &str) -> StorageResult<Option<Credential>>;
    fn find_by_id(&self, id: &str) -> StorageResult<Option<Credential>>;
    fn list(&self) -> StorageResult<Vec<Credential>>;
}

/// Catalog item storage
///
/// `atomic_update` is the serialization point for stock movements: the
/// closure observes the current item and either mutates it (return
/// `true` to commit) or declines (`false`, nothing written). While the
/// closure runs, no other update to the *same* item may interleave;
/// updates to different items are independent.
pub trait ItemStore: Send + Sync + 'static {
    fn get(&self, id: &str) -> StorageResult<Option<CatalogItem>>;
    fn list(&self) -> StorageResult<Vec<CatalogItem>>;
    fn put(&self, item: &CatalogItem) -> StorageResult<()>;
    /// Returns whether an item existed and was removed
    fn delete(&self, id: &str) -> StorageResult<bool>;
    fn atomic_update(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut CatalogItem) -> bool,
    ) -> StorageResult<AtomicUpdate>;
}

/// Order storage (insert-mostly; only `status` changes after creation)
pub trait OrderStore: Send + Sync + 'static {
    fn insert(&self, order: &Order) -> StorageResult<()>;
    fn get(&self, id: &str) -> StorageResult<Option<Order>>;
    /// All orders, newest first
    fn list(&self) -> StorageResult<Vec<Order>>;
    fn set_status(&self, id: &str, status: OrderStatus) -> StorageResult<Option<Order>>;
}
