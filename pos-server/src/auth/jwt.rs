//! JWT token service
//!
//! Issues and verifies the signed bearer tokens that carry the caller's
//! identity. Verification is pure over (token, secret, clock): it never
//! touches the credential store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::Role;

use super::AuthError;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(480), // 8 hours
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pos-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pos-clients".to_string()),
        }
    }
}

/// Load the signing secret from the environment
///
/// Production refuses to start without a real secret; development
/// generates a throwaway one so the server still comes up.
fn load_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            panic!("JWT_SECRET must be at least 32 characters long");
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generate_printable_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        }
    }
}

/// Generate a printable random secret (development fallback)
#[allow(dead_code)]
fn generate_printable_secret() -> String {
    use ring::rand::{SecureRandom, SystemRandom};

    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_!@#$%^&*";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // SystemRandom failing is effectively unreachable; a fixed dev
        // key keeps the development server bootable regardless.
        return "pos-server-development-fallback-secret-key".to_string();
    }

    bytes
        .iter()
        .map(|b| CHARSET[(*b as usize) % CHARSET.len()] as char)
        .collect()
}

/// Claims embedded in issued tokens
///
/// Compatibility contract: `sub` (user id), `username` and `role` plus
/// standard expiry claims. Role travels as a string so tokens stay
/// inspectable; it is parsed back into the closed [`Role`] enum during
/// verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Username
    pub username: String,
    /// Role name
    pub role: String,
    /// Expiry timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Verified caller identity
///
/// Produced only by [`JwtService::verify`]; immutable; lives for one
/// request.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<Claims> for CallerIdentity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role: Role = claims
            .role
            .parse()
            .map_err(|e: shared::UnknownRole| AuthError::MalformedCredential(e.to_string()))?;

        let issued_at = DateTime::from_timestamp(claims.iat, 0)
            .ok_or_else(|| AuthError::MalformedCredential("invalid iat claim".to_string()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::MalformedCredential("invalid exp claim".to_string()))?;

        Ok(Self {
            user_id: claims.sub,
            username: claims.username,
            role,
            issued_at,
            expires_at,
        })
    }
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::GenerationFailed(e.to_string()))
    }

    /// Verify a caller-supplied bearer value and derive the identity
    ///
    /// `bearer` is the raw `Authorization` header value, if any.
    pub fn verify(&self, bearer: Option<&str>) -> Result<CallerIdentity, AuthError> {
        let token = bearer
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingCredential)?;

        let claims = self.validate_token(token)?;
        CallerIdentity::try_from(claims)
    }

    /// Validate and decode a raw token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => AuthError::MalformedCredential(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_minutes: 60,
            issuer: "pos-server".to_string(),
            audience: "pos-clients".to_string(),
        }
    }

    fn service() -> JwtService {
        JwtService::with_config(test_config("unit-test-secret-key-0123456789abcdef"))
    }

    #[test]
    fn test_generation_and_verification() {
        let service = service();
        let token = service
            .generate_token("user-123", "alice", Role::Manager)
            .expect("failed to generate token");

        let bearer = format!("Bearer {}", token);
        let identity = service
            .verify(Some(&bearer))
            .expect("failed to verify token");

        assert_eq!(identity.user_id, "user-123");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Manager);
        assert!(identity.expires_at > identity.issued_at);
    }

    #[test]
    fn test_missing_credential() {
        let service = service();
        assert!(matches!(
            service.verify(None),
            Err(AuthError::MissingCredential)
        ));
        // A header without the Bearer scheme carries no usable credential
        assert!(matches!(
            service.verify(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut config = test_config("unit-test-secret-key-0123456789abcdef");
        config.expiration_minutes = -5;
        let service = JwtService::with_config(config);

        let token = service
            .generate_token("user-123", "alice", Role::Staff)
            .expect("failed to generate token");
        let bearer = format!("Bearer {}", token);

        assert!(matches!(
            service.verify(Some(&bearer)),
            Err(AuthError::ExpiredCredential)
        ));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let issuer = JwtService::with_config(test_config("issuer-secret-key-0123456789abcdef"));
        let verifier = JwtService::with_config(test_config("other-secret-key-0123456789abcdefgh"));

        let token = issuer
            .generate_token("user-123", "alice", Role::Admin)
            .expect("failed to generate token");
        let bearer = format!("Bearer {}", token);

        assert!(matches!(
            verifier.verify(Some(&bearer)),
            Err(AuthError::MalformedCredential(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = service();
        assert!(matches!(
            service.verify(Some("Bearer not.a.token")),
            Err(AuthError::MalformedCredential(_))
        ));
    }
}
