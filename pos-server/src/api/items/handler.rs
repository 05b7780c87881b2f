//! Catalog item API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{CatalogItem, ItemCreate, ItemUpdate};
use uuid::Uuid;

use crate::auth::{self, CallerIdentity};
use crate::core::ServerState;
use crate::ledger::StockError;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/items - the public menu (available items only)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<CatalogItem>>>> {
    let items = state
        .items
        .list()?
        .into_iter()
        .filter(|i| i.is_available)
        .collect();
    Ok(ok(items))
}

/// GET /api/items/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    _identity: CallerIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<CatalogItem>>> {
    let item = state
        .items
        .get(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))?;
    Ok(ok(item))
}

/// POST /api/items - create an item (catalog managers only)
pub async fn create(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Json(req): Json<ItemCreate>,
) -> AppResult<Json<AppResponse<CatalogItem>>> {
    auth::authorize(&identity, &state.config.policy.catalog_write)?;

    if req.price < Decimal::ZERO {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }

    let item = CatalogItem {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        category: req.category,
        price: req.price,
        available_quantity: req.available_quantity.unwrap_or(0),
        is_available: req.is_available.unwrap_or(true),
        image_ref: req.image_ref,
        created_at: Utc::now(),
    };
    state.items.put(&item)?;

    tracing::info!(item_id = %item.id, name = %item.name, "item created");

    Ok(ok(item))
}

/// PUT /api/items/:id - update catalog fields
///
/// Goes through `atomic_update` so a concurrent settlement's stock
/// decrement is never overwritten by a stale read of the item.
pub async fn update(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<ItemUpdate>,
) -> AppResult<Json<AppResponse<CatalogItem>>> {
    auth::authorize(&identity, &state.config.policy.catalog_write)?;

    if let Some(price) = req.price
        && price < Decimal::ZERO
    {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }

    let mut updated: Option<CatalogItem> = None;
    let outcome = state.items.atomic_update(&id, &mut |item| {
        if let Some(name) = &req.name {
            item.name = name.clone();
        }
        if let Some(category) = req.category {
            item.category = category;
        }
        if let Some(price) = req.price {
            item.price = price;
        }
        if let Some(is_available) = req.is_available {
            item.is_available = is_available;
        }
        if let Some(image_ref) = &req.image_ref {
            item.image_ref = image_ref.clone();
        }
        updated = Some(item.clone());
        true
    })?;

    match outcome {
        crate::db::AtomicUpdate::Missing => Err(AppError::NotFound(format!("Item {}", id))),
        _ => {
            let item = updated.ok_or_else(|| {
                AppError::Internal("update closure did not capture the item".to_string())
            })?;
            Ok(ok(item))
        }
    }
}

/// DELETE /api/items/:id
pub async fn delete(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    auth::authorize(&identity, &state.config.policy.catalog_write)?;

    if !state.items.delete(&id)? {
        return Err(AppError::NotFound(format!("Item {}", id)));
    }

    tracing::info!(item_id = %id, "item deleted");

    Ok(ok(()))
}

/// Restock payload
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
}

/// Stock figure after a restock
#[derive(Debug, Serialize)]
pub struct StockInfo {
    pub item_id: String,
    pub available_quantity: u32,
}

/// POST /api/items/:id/restock - add stock through the ledger
pub async fn restock(
    State(state): State<ServerState>,
    identity: CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> AppResult<Json<AppResponse<StockInfo>>> {
    auth::authorize(&identity, &state.config.policy.restock)?;

    if req.quantity == 0 {
        return Err(AppError::Validation("Restock quantity must be positive".to_string()));
    }

    let available_quantity = state
        .ledger
        .restock(&id, req.quantity)
        .map_err(|e: StockError| AppError::from(e))?;

    tracing::info!(item_id = %id, quantity = req.quantity, available_quantity, "item restocked");

    Ok(ok(StockInfo {
        item_id: id,
        available_quantity,
    }))
}
