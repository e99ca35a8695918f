//! Report error types.

use common::CartLineId;
use domain::{ErrorKind, OrderStatus};
use thiserror::Error;

/// Errors that can occur while building reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cart line not found: {0}")]
    CartLineNotFound(CartLineId),

    /// Listing by order status found nothing.
    #[error("No cart lines with order status {0}")]
    NoLinesWithStatus(OrderStatus),

    /// No purchase line references an existing product.
    #[error("No products have been sold")]
    NoSales,

    /// An error occurred in the inventory store.
    #[error("Store error: {0}")]
    Store(#[from] inventory_store::StoreError),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::CartLineNotFound(_)
            | ReportError::NoLinesWithStatus(_)
            | ReportError::NoSales => ErrorKind::NotFound,
            ReportError::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
