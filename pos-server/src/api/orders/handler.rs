//! Order API handlers
//!
//! Creation delegates to the settlement engine; everything here is
//! verification, gating and serialization.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::{Order, OrderRequest, OrderStatusUpdate};

use crate::auth::{self, CallerIdentity};
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/orders - settle an order
pub async fn create(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Json(req): Json<OrderRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    auth::authorize(&identity, &state.config.policy.orders_create)?;

    let order = state.settlement.settle(&req, &identity)?;
    Ok(ok(order))
}

/// GET /api/orders - all orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    identity: CallerIdentity,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    auth::authorize(&identity, &state.config.policy.orders_read)?;

    Ok(ok(state.orders.list()?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    auth::authorize(&identity, &state.config.policy.orders_read)?;

    let order = state
        .orders
        .get(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))?;
    Ok(ok(order))
}

/// PATCH /api/orders/:id/status - the only post-settlement mutation
pub async fn update_status(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<OrderStatusUpdate>,
) -> AppResult<Json<AppResponse<Order>>> {
    auth::authorize(&identity, &state.config.policy.orders_update)?;

    let order = state
        .orders
        .set_status(&id, req.status)?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))?;

    tracing::info!(order_id = %id, status = ?req.status, "order status updated");

    Ok(ok(order))
}
