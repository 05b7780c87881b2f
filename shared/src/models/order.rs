//! Order Model
//!
//! Orders are immutable after settlement except for `status`. Line
//! items embed name/price snapshots taken at settlement time; later
//! catalog edits never touch historical orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment method recorded with an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

/// Service mode for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    TakeOut,
    Delivery,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// One settled order line
///
/// `item_id` is a non-owning reference into the catalog; `name` and
/// `price` are snapshots frozen at settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Extra charge attached to an order (service fee, delivery, tip)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraCharge {
    pub description: String,
    pub amount: Decimal,
}

/// Settled order entity
///
/// Invariants: `subtotal == Σ line.price * line.quantity` and
/// `total == subtotal + Σ extra_charges.amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub extra_charges: Vec<ExtraCharge>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub status: OrderStatus,
    /// Username of the credential that placed the order
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One requested line in an order-to-be
///
/// Only the item reference and quantity come from the caller; name and
/// price are resolved from the catalog at settlement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequestLine {
    pub item_id: String,
    pub quantity: u32,
}

/// Inbound order request, prior to settlement
///
/// `subtotal`/`total` are the caller's declared figures; the settlement
/// engine recomputes both and rejects the request if they disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub lines: Vec<OrderRequestLine>,
    #[serde(default)]
    pub extra_charges: Vec<ExtraCharge>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_type: OrderType,
}

/// Status patch payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
