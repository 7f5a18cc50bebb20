//! Account lifecycle notices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sent after a new account has been registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationNotice {
    /// The new account.
    pub account_id: Uuid,
    /// The username assigned at registration.
    pub username: String,
    /// Address the activation message goes to.
    pub email: String,
    /// When the account was created.
    pub issued_at: DateTime<Utc>,
}

/// Sent after an account's password has been replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangedNotice {
    /// The affected account.
    pub account_id: Uuid,
    /// Username at the time of the change.
    pub username: String,
    /// When the new hash was stored.
    pub changed_at: DateTime<Utc>,
}

/// Any notice a sink can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Account activation.
    Activation(ActivationNotice),
    /// Password changed.
    PasswordChanged(PasswordChangedNotice),
}

impl Notice {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Activation(_) => "activation",
            Self::PasswordChanged(_) => "password_changed",
        }
    }

    /// The account this notice concerns.
    pub fn account_id(&self) -> Uuid {
        match self {
            Self::Activation(n) => n.account_id,
            Self::PasswordChanged(n) => n.account_id,
        }
    }
}
