//! Request DTOs with validation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request body. The username is derived from the email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    /// Password; checked against the password policy by the handler.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Username change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsernameRequest {
    /// New username.
    #[validate(
        length(
            min = 3,
            max = 32,
            message = "Username must be between 3 and 32 characters"
        ),
        custom(function = "validate_username_charset")
    )]
    pub username: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub password: String,
    /// New password.
    #[serde(rename = "newPassword")]
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset").with_message(Cow::Borrowed(
            "Username may only contain letters, digits, '_', '-' and '.'",
        )))
    }
}
