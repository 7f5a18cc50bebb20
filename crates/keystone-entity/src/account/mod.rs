//! Account domain entities.

pub mod feature;
pub mod model;

pub use feature::Feature;
pub use model::{Account, CreateAccount};
