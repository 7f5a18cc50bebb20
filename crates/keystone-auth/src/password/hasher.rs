//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use keystone_core::config::AuthConfig;
use keystone_core::error::AppError;

/// Hashes and verifies passwords with Argon2id.
///
/// Cost parameters come from [`AuthConfig`]; stored hashes carry their own
/// parameters, so raising the cost does not invalidate existing hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash checked when there is no stored hash, so unknown usernames
    /// cost as much as wrong passwords.
    decoy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl PasswordHasher {
    /// Creates a hasher with the configured Argon2 cost.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy_hash: String::new(),
        };
        hasher.decoy_hash = hasher.hash_password("keystone-decoy-password")?;
        Ok(hasher)
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Fails closed: a malformed or unsupported hash verifies as `false`.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// [`hash_password`](Self::hash_password) on the blocking pool.
    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }

    /// [`verify_password`](Self::verify_password) on the blocking pool.
    pub async fn verify(&self, password: String, hash: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .unwrap_or(false)
    }

    /// Spend one verification's worth of work without a real hash.
    pub async fn verify_decoy(&self, password: String) {
        let decoy = self.decoy_hash.clone();
        let _ = self.verify(password, decoy).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&AuthConfig {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash_password("correct-pw").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct-pw", &hash));
        assert!(!hasher.verify_password("wrong-pw", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = hasher();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        let hasher = hasher();
        assert!(!hasher.verify_password("anything", ""));
        assert!(!hasher.verify_password("anything", "not-a-phc-string"));
        assert!(!hasher.verify_password("anything", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn test_verifies_hash_made_with_other_cost() {
        let cheap = hasher();
        let hash = cheap.hash_password("pw").unwrap();

        let costlier = PasswordHasher::new(&AuthConfig {
            argon2_memory_kib: 2048,
            argon2_iterations: 2,
            ..AuthConfig::default()
        })
        .unwrap();
        assert!(costlier.verify_password("pw", &hash));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = PasswordHasher::new(&AuthConfig {
            argon2_iterations: 0,
            ..AuthConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, keystone_core::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_decoy_never_matches_real_input() {
        let hasher = hasher();
        assert!(!hasher.verify_password("correct-pw", &hasher.decoy_hash));
        hasher.verify_decoy("correct-pw".to_string()).await;
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let hasher = hasher();
        let hash = hasher.hash("correct-pw".to_string()).await.unwrap();
        assert!(hasher.verify("correct-pw".to_string(), hash.clone()).await);
        assert!(!hasher.verify("wrong".to_string(), hash).await);
    }
}
