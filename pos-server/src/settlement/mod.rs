//! Order settlement engine
//!
//! Converts an order request into a persisted [`Order`] plus consistent
//! stock decrements, all-or-nothing. Any failure after the first
//! reservation triggers compensation: every prior decrement is restocked
//! before the error surfaces, so the ledger never holds a partial order.
//!
//! Money is `rust_decimal::Decimal` end to end; declared totals are
//! recomputed from catalog prices and compared within
//! [`MONEY_TOLERANCE`], never with binary floats.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{CatalogItem, Order, OrderLine, OrderRequest, OrderStatus};
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::db::{ItemStore, OrderStore};
use crate::ledger::{StockError, StockLedger};

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Settlement failure
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order contains no line items")]
    EmptyOrder,

    #[error("invalid quantity for item {item_id}: must be at least 1")]
    InvalidQuantity { item_id: String },

    #[error("declared {field} {declared} does not match computed {computed}")]
    InvalidTotals {
        field: &'static str,
        declared: Decimal,
        computed: Decimal,
    },

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("order could not be persisted: {0}")]
    PersistenceFailure(String),
}

/// Order settlement engine
///
/// Reads the catalog through the item store, moves stock through the
/// ledger, persists through the order store. All three are injected.
#[derive(Clone)]
pub struct SettlementEngine {
    items: Arc<dyn ItemStore>,
    orders: Arc<dyn OrderStore>,
    ledger: StockLedger,
}

impl SettlementEngine {
    pub fn new(items: Arc<dyn ItemStore>, orders: Arc<dyn OrderStore>, ledger: StockLedger) -> Self {
        Self {
            items,
            orders,
            ledger,
        }
    }

    /// Settle an order request for a verified caller
    ///
    /// Validation failures (empty order, totals mismatch, unknown item)
    /// happen before any mutation. Once reservations begin, any failure
    /// rolls back every reservation made for this request.
    pub fn settle(
        &self,
        request: &OrderRequest,
        identity: &CallerIdentity,
    ) -> Result<Order, OrderError> {
        // 1. Shape validation, no mutation
        if request.lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(line) = request.lines.iter().find(|l| l.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                item_id: line.item_id.clone(),
            });
        }

        // 2. Resolve catalog snapshots and recompute money
        let lines = self.resolve_lines(request)?;
        let subtotal: Decimal = lines
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum();
        let extra: Decimal = request.extra_charges.iter().map(|c| c.amount).sum();
        let total = subtotal + extra;

        check_declared("subtotal", request.subtotal, subtotal)?;
        check_declared("total", request.total, total)?;

        // 3. Reserve stock line by line
        let mut reserved: Vec<(&str, u32)> = Vec::with_capacity(lines.len());
        for line in &lines {
            if let Err(e) = self.ledger.reserve_decrement(&line.item_id, line.quantity) {
                self.release(&reserved);
                return Err(e.into());
            }
            reserved.push((&line.item_id, line.quantity));
        }

        // 4. Persist; a failure here gets the same compensation
        let order = Order {
            id: Uuid::new_v4().to_string(),
            lines,
            extra_charges: request.extra_charges.clone(),
            subtotal,
            total,
            payment_method: request.payment_method,
            order_type: request.order_type,
            status: OrderStatus::default(),
            created_by: identity.username.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.orders.insert(&order) {
            let reserved: Vec<(&str, u32)> = order
                .lines
                .iter()
                .map(|l| (l.item_id.as_str(), l.quantity))
                .collect();
            self.release(&reserved);
            tracing::error!(order_id = %order.id, error = %e, "order persistence failed, stock released");
            return Err(OrderError::PersistenceFailure(e.to_string()));
        }

        tracing::info!(
            order_id = %order.id,
            created_by = %order.created_by,
            lines = order.lines.len(),
            total = %order.total,
            "order settled"
        );

        Ok(order)
    }

    /// Snapshot name/price from the catalog for every requested line
    fn resolve_lines(&self, request: &OrderRequest) -> Result<Vec<OrderLine>, OrderError> {
        request
            .lines
            .iter()
            .map(|line| {
                let item: CatalogItem = self
                    .items
                    .get(&line.item_id)
                    .map_err(StockError::from)?
                    .ok_or_else(|| StockError::ItemNotFound(line.item_id.clone()))?;
                Ok(OrderLine {
                    item_id: item.id,
                    name: item.name,
                    price: item.price,
                    quantity: line.quantity,
                })
            })
            .collect()
    }

    /// Compensation: return every reserved quantity to the ledger
    ///
    /// A restock failing here means the item vanished mid-settlement or
    /// the store itself is down; it is logged for operator attention but
    /// cannot mask the original failure.
    fn release(&self, reserved: &[(&str, u32)]) {
        for (item_id, quantity) in reserved {
            if let Err(e) = self.ledger.restock(item_id, *quantity) {
                tracing::error!(item_id, quantity, error = %e, "compensating restock failed");
            }
        }
    }
}

fn check_declared(
    field: &'static str,
    declared: Decimal,
    computed: Decimal,
) -> Result<(), OrderError> {
    if (declared - computed).abs() > MONEY_TOLERANCE {
        return Err(OrderError::InvalidTotals {
            field,
            declared,
            computed,
        });
    }
    Ok(())
}
