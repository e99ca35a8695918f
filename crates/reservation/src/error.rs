//! Reservation workflow error types.

use common::{CartLineId, ProductId};
use domain::{DomainError, ErrorKind, OrderStatus};
use inventory_store::StoreError;
use thiserror::Error;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// No product has this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No cart line has this id.
    #[error("Cart line not found: {0}")]
    CartLineNotFound(CartLineId),

    /// The requested quantity exceeds what is currently in stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Quantities must be positive and fit the stock counter.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Applying the delta would take stock below zero or past its maximum.
    #[error("Stock adjustment of {delta} out of range for product {product_id} (current stock {current})")]
    StockOutOfRange {
        product_id: ProductId,
        current: u32,
        delta: i64,
    },

    /// Paid purchase lines can no longer be removed from the cart.
    #[error("Cart line {0} is already paid")]
    LineAlreadyPaid(CartLineId),

    /// Order status only applies to purchase lines.
    #[error("Cart line {0} is an appointment and has no order status")]
    NotAPurchase(CartLineId),

    /// Pending purchase lines still reference the product.
    #[error("Product {product_id} is referenced by {pending_lines} pending cart line(s)")]
    ProductInUse {
        product_id: ProductId,
        pending_lines: u64,
    },

    /// Another operator changed the order status first.
    #[error(
        "Order status of cart line {line_id} changed concurrently: expected {}, found {}",
        .expected.map_or("UNSET", |s| s.as_str()),
        .current.map_or("UNSET", |s| s.as_str())
    )]
    ConcurrentStatusChange {
        line_id: CartLineId,
        expected: Option<OrderStatus>,
        current: Option<OrderStatus>,
    },

    /// A stock change could not be reverted after a failed cart line write.
    #[error("Compensation step '{step}' failed: {reason}")]
    CompensationFailed { step: &'static str, reason: String },

    /// Domain validation error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReservationError {
    /// Classifies this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::ProductNotFound(_) | ReservationError::CartLineNotFound(_) => {
                ErrorKind::NotFound
            }
            ReservationError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            ReservationError::InvalidQuantity(_)
            | ReservationError::StockOutOfRange { .. }
            | ReservationError::LineAlreadyPaid(_)
            | ReservationError::NotAPurchase(_) => ErrorKind::InvalidArgument,
            ReservationError::ProductInUse { .. }
            | ReservationError::ConcurrentStatusChange { .. } => ErrorKind::Conflict,
            ReservationError::Domain(e) => e.kind(),
            ReservationError::CompensationFailed { .. } | ReservationError::Store(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Convenience type alias for workflow results.
pub type Result<T> = std::result::Result<T, ReservationError>;
