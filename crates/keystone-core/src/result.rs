//! Convenience result type alias for Keystone.

use crate::error::AppError;

/// A specialized `Result` type for Keystone operations.
pub type AppResult<T> = Result<T, AppError>;
