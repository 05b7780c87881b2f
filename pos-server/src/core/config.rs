//! Server configuration
//!
//! All settings come from the environment with sensible defaults:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | ./data | Database and log directory |
//! | HTTP_PORT | 5000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | JWT_SECRET | (generated in dev) | Token signing secret, >= 32 chars |
//! | JWT_EXPIRATION_MINUTES | 480 | Token lifetime |
//! | VERIFY_USER_ON_REQUEST | false | Re-check the credential store per request |
//! | POLICY_* | v1 defaults | Per-operation allowed-role overrides |

use std::path::PathBuf;

use crate::auth::{AccessPolicy, JwtConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Trust-token vs verify-against-store: when true, authenticated
    /// requests re-check that the credential still exists
    pub verify_user_on_request: bool,
    /// Per-operation allowed-role sets
    pub policy: AccessPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            verify_user_on_request: std::env::var("VERIFY_USER_ON_REQUEST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            policy: AccessPolicy::from_env(),
        }
    }

    /// Path of the embedded database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("pos.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
