//! HS256 session token issuance and resolution.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use keystone_core::config::{AuthConfig, MAX_JWT_TTL_MINUTES};
use keystone_core::error::AppError;

use super::claims::Claims;

/// Issues signed session tokens and resolves them back to account IDs.
///
/// The signing secret is injected at construction; there is no
/// process-global key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration. The lifetime is capped at
    /// [`MAX_JWT_TTL_MINUTES`].
    pub fn new(config: &AuthConfig) -> Self {
        let ttl_minutes = i64::try_from(config.jwt_ttl_minutes.min(MAX_JWT_TTL_MINUTES))
            .unwrap_or_default();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.jwt_leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: chrono::Duration::minutes(ttl_minutes),
        }
    }

    /// Issues a token whose subject is `account_id`.
    pub fn issue(&self, account_id: Uuid) -> Result<String, AppError> {
        self.sign(&Claims::new(account_id, Utc::now(), self.ttl))
    }

    /// Signs arbitrary claims with the configured key.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }

    /// Resolves a token to the account ID it was issued for.
    ///
    /// Bad signatures, expiry, wrong algorithms, and malformed or missing
    /// claims all yield the same `Authentication` error. The specific cause
    /// is only logged at debug level.
    pub fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.account_id())
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Rejected session token");
                AppError::authentication("invalid token")
            })
    }
}
