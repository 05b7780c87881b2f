//! Authentication and authorization
//!
//! - [`JwtService`] - bearer token issuance and verification
//! - [`CallerIdentity`] - verified caller context, one per request
//! - [`AccessPolicy`] / [`authorize`] - role gating
//! - [`require_auth`] - authentication middleware

pub mod extractor;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;

use shared::Role;

pub use gate::{AccessPolicy, RoleSet, authorize};
pub use jwt::{CallerIdentity, Claims, JwtConfig, JwtService};
pub use middleware::require_auth;

/// Authentication / authorization failure
///
/// Every failure on the credential path maps to exactly one variant;
/// nothing on this path is reported by panicking or by a bare status
/// code.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer credential was supplied with the request
    #[error("missing credential")]
    MissingCredential,

    /// The credential was validly signed but is past its expiry
    #[error("credential expired")]
    ExpiredCredential,

    /// Bad signature, bad structure, or claims that do not parse
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The caller's role is not in the operation's allowed set
    #[error("role '{role}' is not permitted to {operation}")]
    InsufficientRole { role: Role, operation: &'static str },

    /// Token could not be issued (signing failure)
    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}
