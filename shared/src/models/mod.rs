//! Data models
//!
//! Shared between pos-server and frontend (via API).
//! All IDs are opaque strings (UUID v4 at creation time).

pub mod credential;
pub mod item;
pub mod order;
pub mod role;

// Re-exports
pub use credential::*;
pub use item::*;
pub use order::*;
pub use role::*;
