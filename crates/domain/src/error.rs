//! Domain error types.

use thiserror::Error;

use crate::order_status::OrderStatus;

/// Validation failures raised by the domain model itself.
///
/// These never involve I/O; they describe inputs or transitions that the
/// model rejects regardless of what is stored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Cart quantities must be strictly positive.
    #[error("Invalid quantity: {0} (must be greater than zero)")]
    InvalidQuantity(i64),

    /// The requested order status change is not a single forward step.
    #[error(
        "Invalid order status transition from {} to {to}",
        .from.map_or("UNSET", |s| s.as_str())
    )]
    InvalidTransition {
        from: Option<OrderStatus>,
        to: OrderStatus,
    },

    /// An order status string did not name a known status.
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// A payment status string did not name a known status.
    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    /// A product condition string was neither USED nor NEW.
    #[error("Unknown product condition: {0}")]
    UnknownCondition(String),

    /// An appointment was missing a required field.
    #[error("Invalid appointment: {0}")]
    InvalidAppointment(String),
}

/// Broad classes of failure surfaced to callers.
///
/// Every service error maps onto exactly one kind so that transports can
/// choose a response without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced product or cart line does not exist.
    NotFound,
    /// The requested quantity exceeds available stock.
    InsufficientStock,
    /// The request itself is malformed or would break an invariant.
    InvalidArgument,
    /// The request conflicts with the current state of a record.
    Conflict,
    /// The store or a compensating action failed.
    Internal,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidTransition { .. } => ErrorKind::Conflict,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type for domain validation.
pub type Result<T> = std::result::Result<T, DomainError>;
