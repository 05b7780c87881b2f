//! Authentication middleware
//!
//! Verifies the bearer token on every API request and injects the
//! resulting [`CallerIdentity`] into request extensions.
//!
//! # Paths that skip authentication
//!
//! - `OPTIONS *` (CORS preflight)
//! - anything outside `/api/`
//! - `/api/auth/login`, `/api/auth/signup`, `/api/health`
//! - `GET /api/items`, `GET /api/categories` (the public menu)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to their own handlers (404 etc.)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public = matches!(path, "/api/auth/login" | "/api/auth/signup" | "/api/health")
        || (req.method() == http::Method::GET
            && matches!(path, "/api/items" | "/api/categories"));
    if is_public {
        return Ok(next.run(req).await);
    }

    let bearer = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let identity = match state.get_jwt_service().verify(bearer) {
        Ok(identity) => identity,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            return Err(e.into());
        }
    };

    // Optional verify-against-store policy: a deleted credential makes
    // an otherwise valid token unusable immediately.
    if state.config.verify_user_on_request {
        let known = state
            .credentials
            .find_by_username(&identity.username)?
            .is_some();
        if !known {
            security_log!(
                "WARN",
                "auth_stale_credential",
                username = identity.username.clone()
            );
            return Err(AppError::Unauthorized);
        }
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
