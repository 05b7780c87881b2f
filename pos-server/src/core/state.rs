//! Server state
//!
//! [`ServerState`] holds shared references to every service a handler
//! needs. Stores are trait objects so the whole state can be built over
//! the embedded database in production or the in-memory store in tests.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{CredentialStore, ItemStore, OrderStore, RedbStore, StorageError};
use crate::ledger::StockLedger;
use crate::settlement::SettlementEngine;

/// Shared server state (cheap to clone; everything behind `Arc`)
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub credentials: Arc<dyn CredentialStore>,
    pub items: Arc<dyn ItemStore>,
    pub orders: Arc<dyn OrderStore>,
    pub ledger: StockLedger,
    pub settlement: SettlementEngine,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Build state over the embedded database in `config.work_dir`
    pub fn initialize(config: Config) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.work_dir).ok();
        let store = Arc::new(RedbStore::open(config.db_path())?);
        Ok(Self::with_stores(
            config,
            store.clone(),
            store.clone(),
            store,
        ))
    }

    /// Build state over explicit store implementations
    ///
    /// Tests pass the same `Arc<MemoryStore>` for all three.
    pub fn with_stores(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        items: Arc<dyn ItemStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let ledger = StockLedger::new(items.clone());
        let settlement = SettlementEngine::new(items.clone(), orders.clone(), ledger.clone());

        Self {
            config: Arc::new(config),
            credentials,
            items,
            orders,
            ledger,
            settlement,
            jwt_service,
        }
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
