//! Feature flag names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use keystone_core::AppError;

/// Maximum length of a feature name.
pub const MAX_FEATURE_LEN: usize = 64;

/// A validated feature flag name.
///
/// Lowercase ASCII letters, digits, `_`, `-` and `.`; 1 to 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Feature(String);

impl Feature {
    /// Return the flag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Feature {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid_char =
            |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.');

        if s.is_empty() || s.len() > MAX_FEATURE_LEN || !s.chars().all(valid_char) {
            return Err(AppError::validation(format!(
                "Invalid feature name: '{s}'. Use 1-{MAX_FEATURE_LEN} lowercase letters, digits, '_', '-' or '.'"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Feature {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.0
    }
}
