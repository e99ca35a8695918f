//! Order fulfillment state machine.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Fulfillment stage of a cart line.
///
/// Transitions under the strict policy:
/// ```text
/// (unset) ──► Processing ──► Shipped ──► Delivered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses in fulfillment order.
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    /// Returns the status that directly follows `current`.
    pub fn next_after(current: Option<OrderStatus>) -> Option<OrderStatus> {
        match current {
            None => Some(OrderStatus::Processing),
            Some(OrderStatus::Processing) => Some(OrderStatus::Shipped),
            Some(OrderStatus::Shipped) => Some(OrderStatus::Delivered),
            Some(OrderStatus::Delivered) => None,
        }
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            _ => Err(DomainError::UnknownOrderStatus(s.to_string())),
        }
    }
}

/// How order status changes are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatusPolicy {
    /// Only single forward steps are accepted; re-applying the current
    /// status is a no-op.
    #[default]
    Strict,
    /// Any status may replace any other, including moving backwards.
    Unrestricted,
}

impl OrderStatusPolicy {
    /// Checks whether `from → to` is allowed under this policy.
    pub fn check(&self, from: Option<OrderStatus>, to: OrderStatus) -> Result<(), DomainError> {
        match self {
            OrderStatusPolicy::Unrestricted => Ok(()),
            OrderStatusPolicy::Strict => {
                if from == Some(to) || OrderStatus::next_after(from) == Some(to) {
                    Ok(())
                } else {
                    Err(DomainError::InvalidTransition { from, to })
                }
            }
        }
    }
}

impl std::str::FromStr for OrderStatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(OrderStatusPolicy::Strict),
            "unrestricted" => Ok(OrderStatusPolicy::Unrestricted),
            other => Err(format!("unknown order status policy: {other}")),
        }
    }
}
