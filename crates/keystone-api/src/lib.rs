//! # keystone-api
//!
//! HTTP API layer for Keystone built on Axum.
//!
//! Provides the login, registration, and self-service account endpoints,
//! the bearer-token extractor, request DTOs with validation, middleware
//! (CORS, request logging), and the mapping from `AppError` to responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
