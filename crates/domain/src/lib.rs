//! Domain model for the inventory and order service.
//!
//! This crate holds the data model shared by the store, the reservation
//! workflow and the reporting queries:
//! - [`Product`] records with their `stock` counter
//! - [`CartLine`] records, tagged as purchases or appointments via [`LineKind`]
//! - [`PaymentStatus`] and the [`OrderStatus`] fulfillment state machine
//! - [`UserSummary`] for joining owner details into admin listings

pub mod cart;
pub mod error;
pub mod order_status;
pub mod product;
pub mod user;

pub use cart::{Appointment, CartLine, LineKind, PaymentStatus};
pub use common::{CartLineId, ProductId, UserId};
pub use error::{DomainError, ErrorKind, Result};
pub use order_status::{OrderStatus, OrderStatusPolicy};
pub use product::{NewProduct, Product, ProductCondition, apply_stock_delta};
pub use user::UserSummary;
