//! Handler-level flows against the in-memory store

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use rust_decimal::Decimal;
use shared::{
    Category, ItemCreate, LoginRequest, OrderRequest, OrderRequestLine, OrderType, PaymentMethod,
    Role, SignupRequest,
};

use crate::api::{auth as auth_api, items, orders};
use crate::auth::{AccessPolicy, CallerIdentity, JwtConfig};
use crate::core::{Config, ServerState};
use crate::db::MemoryStore;
use crate::utils::AppError;

fn test_state() -> ServerState {
    let config = Config {
        work_dir: ".".to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "handler-test-secret-key-0123456789ab".to_string(),
            expiration_minutes: 60,
            issuer: "pos-server".to_string(),
            audience: "pos-clients".to_string(),
        },
        environment: "test".to_string(),
        verify_user_on_request: false,
        policy: AccessPolicy::v1(),
    };
    let store = Arc::new(MemoryStore::new());
    ServerState::with_stores(config, store.clone(), store.clone(), store)
}

fn identity(role: Role) -> CallerIdentity {
    CallerIdentity {
        user_id: "user-1".to_string(),
        username: "tester".to_string(),
        role,
        issued_at: Utc::now(),
        expires_at: Utc::now() + chrono::Duration::hours(1),
    }
}

async fn create_item(state: &ServerState, name: &str, price_cents: i64, stock: u32) -> String {
    let response = items::handler::create(
        State(state.clone()),
        identity(Role::Admin),
        Json(ItemCreate {
            name: name.to_string(),
            category: Category::Lunch,
            price: Decimal::new(price_cents, 2),
            available_quantity: Some(stock),
            is_available: None,
            image_ref: None,
        }),
    )
    .await
    .expect("item creation failed");
    response.0.data.unwrap().id
}

fn order_request(item_id: &str, quantity: u32, total_cents: i64) -> OrderRequest {
    OrderRequest {
        lines: vec![OrderRequestLine {
            item_id: item_id.to_string(),
            quantity,
        }],
        extra_charges: vec![],
        subtotal: Decimal::new(total_cents, 2),
        total: Decimal::new(total_cents, 2),
        payment_method: PaymentMethod::Cash,
        order_type: OrderType::default(),
    }
}

#[tokio::test]
async fn test_signup_then_login_issues_verifiable_token() {
    let state = test_state();

    auth_api::handler::signup(
        State(state.clone()),
        Json(SignupRequest {
            username: "alice".to_string(),
            password: "secret99".to_string(),
            role: Role::Manager,
        }),
    )
    .await
    .expect("signup failed");

    let response = auth_api::handler::login(
        State(state.clone()),
        Json(LoginRequest {
            username: "alice".to_string(),
            password: "secret99".to_string(),
        }),
    )
    .await
    .expect("login failed");

    let login = response.0.data.unwrap();
    assert_eq!(login.user.username, "alice");
    assert_eq!(login.user.role, Role::Manager);

    let bearer = format!("Bearer {}", login.token);
    let verified = state.get_jwt_service().verify(Some(&bearer)).unwrap();
    assert_eq!(verified.username, "alice");
    assert_eq!(verified.role, Role::Manager);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let state = test_state();

    auth_api::handler::signup(
        State(state.clone()),
        Json(SignupRequest {
            username: "alice".to_string(),
            password: "secret99".to_string(),
            role: Role::Staff,
        }),
    )
    .await
    .expect("signup failed");

    let wrong_password = auth_api::handler::login(
        State(state.clone()),
        Json(LoginRequest {
            username: "alice".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let unknown_user = auth_api::handler::login(
        State(state),
        Json(LoginRequest {
            username: "nobody".to_string(),
            password: "secret99".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let (AppError::Validation(a), AppError::Validation(b)) = (wrong_password, unknown_user) else {
        panic!("expected validation errors");
    };
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let state = test_state();
    let req = SignupRequest {
        username: "alice".to_string(),
        password: "secret99".to_string(),
        role: Role::Staff,
    };

    auth_api::handler::signup(State(state.clone()), Json(req.clone()))
        .await
        .expect("signup failed");
    let err = auth_api::handler::signup(State(state), Json(req))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_staff_cannot_write_catalog() {
    let state = test_state();

    let err = items::handler::create(
        State(state),
        identity(Role::Staff),
        Json(ItemCreate {
            name: "Espresso".to_string(),
            category: Category::Drinks,
            price: Decimal::new(250, 2),
            available_quantity: None,
            is_available: None,
            image_ref: None,
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_order_settles_and_decrements_stock() {
    let state = test_state();
    let item_id = create_item(&state, "Pad Thai", 1000, 5).await;

    let response = orders::handler::create(
        State(state.clone()),
        identity(Role::Manager),
        Json(order_request(&item_id, 3, 3000)),
    )
    .await
    .expect("order failed");

    let order = response.0.data.unwrap();
    assert_eq!(order.subtotal, Decimal::new(3000, 2));
    assert_eq!(order.created_by, "tester");

    assert_eq!(state.ledger.get_available(&item_id).unwrap(), 2);

    let listed = orders::handler::list(State(state), identity(Role::Admin))
        .await
        .unwrap();
    assert_eq!(listed.0.data.unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_insufficient_stock_leaves_state_untouched() {
    let state = test_state();
    let item_id = create_item(&state, "Pad Thai", 1000, 2).await;

    let err = orders::handler::create(
        State(state.clone()),
        identity(Role::Manager),
        Json(order_request(&item_id, 3, 3000)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(state.ledger.get_available(&item_id).unwrap(), 2);

    let listed = orders::handler::list(State(state), identity(Role::Admin))
        .await
        .unwrap();
    assert!(listed.0.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_restock_requires_manager_and_adds_stock() {
    let state = test_state();
    let item_id = create_item(&state, "Croissant", 350, 1).await;

    let err = items::handler::restock(
        State(state.clone()),
        identity(Role::Cashier),
        Path(item_id.clone()),
        Json(items::handler::RestockRequest { quantity: 5 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let response = items::handler::restock(
        State(state.clone()),
        identity(Role::Manager),
        Path(item_id.clone()),
        Json(items::handler::RestockRequest { quantity: 5 }),
    )
    .await
    .expect("restock failed");
    assert_eq!(response.0.data.unwrap().available_quantity, 6);
    assert_eq!(state.ledger.get_available(&item_id).unwrap(), 6);
}

#[tokio::test]
async fn test_public_list_hides_unavailable_items() {
    let state = test_state();
    let keep = create_item(&state, "Visible", 100, 1).await;
    let hide = create_item(&state, "Hidden", 100, 1).await;

    items::handler::update(
        State(state.clone()),
        identity(Role::Admin),
        Path(hide),
        Json(shared::ItemUpdate {
            name: None,
            category: None,
            price: None,
            is_available: Some(false),
            image_ref: None,
        }),
    )
    .await
    .expect("update failed");

    let listed = items::handler::list(State(state)).await.unwrap();
    let listed = listed.0.data.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep);
}

#[tokio::test]
async fn test_zero_quantity_order_line_rejected() {
    let state = test_state();
    let item_id = create_item(&state, "Pad Thai", 1000, 5).await;

    let err = orders::handler::create(
        State(state.clone()),
        identity(Role::Manager),
        Json(order_request(&item_id, 0, 0)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(state.ledger.get_available(&item_id).unwrap(), 5);
}

#[tokio::test]
async fn test_update_can_clear_image_ref() {
    let state = test_state();

    let created = items::handler::create(
        State(state.clone()),
        identity(Role::Admin),
        Json(ItemCreate {
            name: "Latte".to_string(),
            category: Category::Drinks,
            price: Decimal::new(400, 2),
            available_quantity: None,
            is_available: None,
            image_ref: Some("menu/latte.jpg".to_string()),
        }),
    )
    .await
    .unwrap();
    let item_id = created.0.data.unwrap().id;

    // Absent field leaves the reference untouched
    let updated = items::handler::update(
        State(state.clone()),
        identity(Role::Admin),
        Path(item_id.clone()),
        Json(shared::ItemUpdate {
            name: Some("Latte Grande".to_string()),
            category: None,
            price: None,
            is_available: None,
            image_ref: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(
        updated.0.data.unwrap().image_ref.as_deref(),
        Some("menu/latte.jpg")
    );

    // Explicit null clears it
    let cleared = items::handler::update(
        State(state),
        identity(Role::Admin),
        Path(item_id),
        Json(shared::ItemUpdate {
            name: None,
            category: None,
            price: None,
            is_available: None,
            image_ref: Some(None),
        }),
    )
    .await
    .unwrap();
    assert_eq!(cleared.0.data.unwrap().image_ref, None);
}
