//! HTTP API
//!
//! One module per resource; each wires its own routes and exposes a
//! `router()`. Handlers run verifier -> gate -> engine/store and wrap
//! results in the [`AppResponse`](crate::utils::AppResponse) envelope.

pub mod auth;
pub mod categories;
pub mod health;
pub mod items;
pub mod orders;

#[cfg(test)]
mod tests;

use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(categories::router())
        .merge(items::router())
        .merge(orders::router())
}
