//! Unified error handling
//!
//! Application-wide error type and response envelope. Domain errors
//! ([`AuthError`], [`StockError`], [`OrderError`], [`StorageError`])
//! convert into [`AppError`], which maps each failure onto one
//! transport status and a stable error code. Nothing is swallowed:
//! every failure path produces exactly one typed result.
//!
//! | Code | Meaning |
//! |------|---------|
//! | E0000 | success |
//! | E0002 | validation failed |
//! | E0003 | resource not found |
//! | E0004 | resource conflict |
//! | E0005 | business rule violation |
//! | E2001 | permission denied |
//! | E3001 | not authenticated |
//! | E3002 | invalid token |
//! | E3003 | token expired |
//! | E9001 | internal error |
//! | E9002 | storage error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::db::StorageError;
use crate::ledger::StockError;
use crate::settlement::OrderError;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    // ========== Authorization errors (403) ==========
    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business logic errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ========== System errors (5xx) ==========
    #[error("Storage error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E3001", "Please login first".to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "E3003", "Token expired".to_string())
            }
            AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".to_string())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }
            AppError::Database(msg) => {
                error!(target: "storage", error = %msg, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredential => AppError::Unauthorized,
            AuthError::ExpiredCredential => AppError::TokenExpired,
            AuthError::MalformedCredential(msg) => AppError::InvalidToken(msg),
            AuthError::InsufficientRole { .. } => AppError::Forbidden(e.to_string()),
            AuthError::GenerationFailed(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StockError> for AppError {
    fn from(e: StockError) -> Self {
        match e {
            StockError::ItemNotFound(id) => AppError::NotFound(format!("Item {}", id)),
            StockError::InsufficientStock { .. } => AppError::BusinessRule(e.to_string()),
            StockError::Storage(inner) => AppError::Database(inner.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidTotals { .. } => AppError::Validation(e.to_string()),
            OrderError::Stock(inner) => inner.into(),
            OrderError::PersistenceFailure(msg) => AppError::Database(msg),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Duplicate(key) => AppError::Conflict(key),
            other => AppError::Database(other.to_string()),
        }
    }
}

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            AppError::from(AuthError::MissingCredential),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AuthError::ExpiredCredential),
            AppError::TokenExpired
        ));
        assert!(matches!(
            AppError::from(AuthError::InsufficientRole {
                role: shared::Role::Staff,
                operation: "manage the catalog",
            }),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn test_order_error_mapping() {
        assert!(matches!(
            AppError::from(OrderError::EmptyOrder),
            AppError::Validation(_)
        ));
        let stock = OrderError::Stock(StockError::InsufficientStock {
            item_id: "a".to_string(),
            requested: 3,
            available: 2,
        });
        assert!(matches!(AppError::from(stock), AppError::BusinessRule(_)));
    }
}
