//! Auth API handlers
//!
//! Signup, login and user listing. Login failures are deliberately
//! uniform: an unknown username and a wrong password produce the same
//! message, so the endpoint does not leak which usernames exist.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use shared::{Credential, LoginRequest, SignupRequest, UserInfo};
use uuid::Uuid;

use crate::auth::{self, CallerIdentity, password};
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Login response with bearer token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// POST /api/auth/signup - create a credential
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<AppResponse<UserInfo>>> {
    if req.username.len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    let credential = Credential {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        password_hash,
        role: req.role,
        created_at: Utc::now(),
    };

    state.credentials.insert(&credential).map_err(|e| match e {
        crate::db::StorageError::Duplicate(_) => {
            AppError::Conflict("Username already exists".to_string())
        }
        other => other.into(),
    })?;

    tracing::info!(username = %credential.username, role = %credential.role, "user created");

    Ok(ok(UserInfo::from(&credential)))
}

/// POST /api/auth/login - verify a password and issue a token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let invalid = || AppError::Validation("Invalid username or password".to_string());

    let credential = state
        .credentials
        .find_by_username(&req.username)?
        .ok_or_else(invalid)?;

    let password_valid = password::verify_password(&req.password, &credential.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    if !password_valid {
        return Err(invalid());
    }

    let token = state.get_jwt_service().generate_token(
        &credential.id,
        &credential.username,
        credential.role,
    )?;

    tracing::info!(
        user_id = %credential.id,
        username = %credential.username,
        role = %credential.role,
        "user logged in"
    );

    Ok(ok(LoginResponse {
        token,
        user: UserInfo::from(&credential),
    }))
}

/// GET /api/auth/me - current caller's identity
pub async fn me(identity: CallerIdentity) -> AppResult<Json<AppResponse<UserInfo>>> {
    Ok(ok(UserInfo {
        id: identity.user_id,
        username: identity.username,
        role: identity.role,
    }))
}

/// GET /api/auth/users - all credentials (user management roles only)
pub async fn list_users(
    State(state): State<ServerState>,
    identity: CallerIdentity,
) -> AppResult<Json<AppResponse<Vec<UserInfo>>>> {
    auth::authorize(&identity, &state.config.policy.users_manage)?;

    let users = state
        .credentials
        .list()?
        .iter()
        .map(UserInfo::from)
        .collect();

    Ok(ok(users))
}
