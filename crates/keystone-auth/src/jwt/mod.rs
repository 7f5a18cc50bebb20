//! Session token claims, issuance, and resolution.

pub mod claims;
pub mod issuer;

pub use claims::Claims;
pub use issuer::TokenIssuer;
