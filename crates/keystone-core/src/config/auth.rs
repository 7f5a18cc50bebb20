//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Longest session lifetime the server accepts: one year.
pub const MAX_JWT_TTL_MINUTES: u64 = 366 * 24 * 60;

/// Token signing, password hashing, and password policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HS256 token signing. Must be set before startup.
    #[serde(default)]
    pub jwt_secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Allowed clock skew in seconds when checking expiry.
    #[serde(default = "default_leeway")]
    pub jwt_leeway_seconds: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 lanes.
    #[serde(default = "default_parallelism")]
    pub argon2_parallelism: u32,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Minimum zxcvbn score (0-4) a new password must reach.
    #[serde(default = "default_strength")]
    pub password_min_strength: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_minutes: default_ttl(),
            jwt_leeway_seconds: default_leeway(),
            argon2_memory_kib: default_memory(),
            argon2_iterations: default_iterations(),
            argon2_parallelism: default_parallelism(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            password_min_strength: default_strength(),
        }
    }
}

fn default_ttl() -> u64 {
    7 * 24 * 60
}

fn default_leeway() -> u64 {
    5
}

// OWASP baseline for argon2id: 19 MiB, 2 passes, 1 lane.
fn default_memory() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_password_min() -> usize {
    8
}

fn default_password_max() -> usize {
    128
}

fn default_strength() -> u8 {
    2
}
