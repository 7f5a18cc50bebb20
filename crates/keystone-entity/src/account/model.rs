//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::feature::Feature;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique, immutable identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Address given at registration.
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Ban expiry. A past value means the ban has lapsed.
    pub banned_until: Option<DateTime<Utc>>,
    /// Moderator-supplied reason for the ban.
    pub ban_reason: Option<String>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Address the last successful login came from.
    pub last_login_ip: Option<String>,
    /// Capability markers attached by administrators.
    pub features: Vec<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether a ban is in force at `now`.
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.is_some_and(|until| until > now)
    }

    /// Whether a ban is currently in force.
    pub fn is_banned(&self) -> bool {
        self.is_banned_at(Utc::now())
    }

    /// Whether the given feature flag is attached.
    pub fn has_feature(&self, feature: &Feature) -> bool {
        self.features.iter().any(|f| f == feature.as_str())
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Desired username.
    pub username: String,
    /// Registration email.
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
}

impl CreateAccount {
    /// Materialize the row that a store would insert.
    pub fn into_account(self, id: Uuid, now: DateTime<Utc>) -> Account {
        Account {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            banned_until: None,
            ban_reason: None,
            last_login_at: None,
            last_login_ip: None,
            features: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
