//! Credential Model

use serde::{Deserialize, Serialize};

use super::Role;

/// Stored credential (one per user)
///
/// Invariant: `username` is unique across all credentials; the
/// credential store enforces it on insert.
///
/// This is the storage model and serializes the password hash; API
/// responses must use [`UserInfo`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public view of a credential (never carries the hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&Credential> for UserInfo {
    fn from(c: &Credential) -> Self {
        Self {
            id: c.id.clone(),
            username: c.username.clone(),
            role: c.role,
        }
    }
}

/// Signup payload
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
