//! Shared identifier types for the inventory and order service.

pub mod types;

pub use types::{CartLineId, ProductId, UserId};
