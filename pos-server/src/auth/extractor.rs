//! Identity extractor
//!
//! Lets protected handlers take [`CallerIdentity`] as an argument. The
//! auth middleware normally verifies the token and caches the identity
//! in request extensions; the extractor falls back to verifying the
//! header itself so handlers also work on routes wired without the
//! middleware (and in tests).

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::CallerIdentity;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by the middleware
        if let Some(identity) = parts.extensions.get::<CallerIdentity>() {
            return Ok(identity.clone());
        }

        let bearer = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match state.get_jwt_service().verify(bearer) {
            Ok(identity) => {
                parts.extensions.insert(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                Err(e.into())
            }
        }
    }
}
