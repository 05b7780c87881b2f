//! POS / Inventory Backend
//!
//! Point-of-sale backend: staff credentials, item catalog, and order
//! settlement against an embedded database, exposed over HTTP.
//!
//! # Module structure
//!
//! ```text
//! pos-server/src/
//! ├── core/        # configuration, state, server bootstrap
//! ├── auth/        # JWT verification, role gate, middleware
//! ├── db/          # store traits + redb / in-memory backends
//! ├── ledger/      # per-item stock ledger
//! ├── settlement/  # order settlement engine
//! ├── api/         # HTTP routes and handlers
//! └── utils/       # error envelope, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod settlement;
pub mod utils;

// Re-export public types
pub use auth::{AccessPolicy, AuthError, CallerIdentity, JwtService, authorize};
pub use crate::core::{Config, Server, ServerState};
pub use db::{CredentialStore, ItemStore, MemoryStore, OrderStore, RedbStore};
pub use ledger::{StockError, StockLedger};
pub use settlement::{OrderError, SettlementEngine};
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event logging - structured entries under the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/___  ______   _____  _____
  / /_/ / / / /\__ \/ _ \/ ___/ | / / _ \/ ___/
 / ____/ /_/ /___/ /  __/ /   | |/ /  __/ /
/_/    \____//____/\___/_/    |___/\___/_/
    "#
    );
}
