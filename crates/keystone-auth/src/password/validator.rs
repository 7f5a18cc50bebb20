//! Password policy enforcement for new passwords.

use keystone_core::config::AuthConfig;
use keystone_core::error::AppError;

/// Validates new passwords against the configured policy.
///
/// Violations are `Validation` errors with field detail under `password`.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    max_length: usize,
    min_strength: zxcvbn::Score,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
            min_strength: score_from(config.password_min_strength),
        }
    }

    /// Validates a password, reporting the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();

        if length < self.min_length {
            return Err(violation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if length > self.max_length {
            return Err(violation(format!(
                "Password must be at most {} characters long",
                self.max_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < self.min_strength {
            return Err(violation(
                "Password is too easy to guess. Use a longer or less common password.",
            ));
        }

        Ok(())
    }
}

fn violation(message: impl Into<String>) -> AppError {
    let message = message.into();
    AppError::validation(message.clone())
        .with_details(serde_json::json!({ "password": [message] }))
}

fn score_from(value: u8) -> zxcvbn::Score {
    match value {
        0 => zxcvbn::Score::Zero,
        1 => zxcvbn::Score::One,
        2 => zxcvbn::Score::Two,
        3 => zxcvbn::Score::Three,
        _ => zxcvbn::Score::Four,
    }
}
