//! Cart lines: stock reservations and service appointments.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CartLineId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::order_status::OrderStatus;

/// Whether a cart line's reservation has been converted to a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            _ => Err(DomainError::UnknownPaymentStatus(s.to_string())),
        }
    }
}

/// A booked service appointment for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub date: NaiveDate,
    pub location: String,
    pub phone_number: String,
}

impl Appointment {
    /// Creates an appointment, rejecting blank location or phone number.
    pub fn new(
        date: NaiveDate,
        location: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let location = location.into();
        let phone_number = phone_number.into();
        if location.trim().is_empty() {
            return Err(DomainError::InvalidAppointment(
                "location is required".to_string(),
            ));
        }
        if phone_number.trim().is_empty() {
            return Err(DomainError::InvalidAppointment(
                "phone number is required".to_string(),
            ));
        }
        Ok(Self {
            date,
            location,
            phone_number,
        })
    }
}

/// What a cart line represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineKind {
    /// `quantity` units of the product are held out of its stock.
    Purchase { quantity: u32 },
    /// A viewing or service booking; never touches stock.
    Appointment(Appointment),
}

/// A cart line owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub payment_status: PaymentStatus,
    pub order_status: Option<OrderStatus>,
    pub kind: LineKind,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a pending purchase line.
    pub fn purchase(
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(0));
        }
        Ok(Self::with_kind(
            user_id,
            product_id,
            LineKind::Purchase { quantity },
        ))
    }

    /// Creates a pending appointment line.
    pub fn appointment(user_id: UserId, product_id: ProductId, appointment: Appointment) -> Self {
        Self::with_kind(user_id, product_id, LineKind::Appointment(appointment))
    }

    fn with_kind(user_id: UserId, product_id: ProductId, kind: LineKind) -> Self {
        Self {
            id: CartLineId::new(),
            product_id,
            user_id,
            payment_status: PaymentStatus::Pending,
            order_status: None,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Units of stock this line holds; zero for appointments.
    pub fn quantity(&self) -> u32 {
        match self.kind {
            LineKind::Purchase { quantity } => quantity,
            LineKind::Appointment(_) => 0,
        }
    }

    pub fn is_purchase(&self) -> bool {
        matches!(self.kind, LineKind::Purchase { .. })
    }

    pub fn is_appointment(&self) -> bool {
        matches!(self.kind, LineKind::Appointment(_))
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Returns the appointment details when this line is a booking.
    pub fn appointment_details(&self) -> Option<&Appointment> {
        match &self.kind {
            LineKind::Appointment(appointment) => Some(appointment),
            LineKind::Purchase { .. } => None,
        }
    }
}
