//! Shared types for the POS backend
//!
//! Domain models used across the server and any API client:
//! roles, catalog items, credentials and orders.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    CatalogItem, Category, Credential, ExtraCharge, ItemCreate, ItemUpdate, LoginRequest, Order,
    OrderLine, OrderRequest, OrderRequestLine, OrderStatus, OrderStatusUpdate, OrderType,
    PaymentMethod, Role,
    SignupRequest, UnknownRole, UserInfo,
};
