//! HTTP integration tests for the Keystone API.
//!
//! Every test drives the real router with `oneshot` against an in-memory
//! account store, so no database is required.

mod helpers;

mod auth_test;
mod user_test;
