//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use reports::ReportError;
use reservation::ReservationError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// The request carries no usable user identity.
    Unauthorized(String),
    /// Workflow error.
    Reservation(ReservationError),
    /// Report query error.
    Report(ReportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, error_body(msg)),
            ApiError::Reservation(err) => reservation_error_to_response(err),
            ApiError::Report(err) => {
                let status = kind_to_status(err.kind());
                (status, message_for(status, &err))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn reservation_error_to_response(err: ReservationError) -> (StatusCode, serde_json::Value) {
    let status = kind_to_status(err.kind());
    match &err {
        ReservationError::InsufficientStock {
            product_id,
            requested,
            available,
        } => (
            status,
            serde_json::json!({
                "error": err.to_string(),
                "productId": product_id,
                "requested": requested,
                "available": available,
            }),
        ),
        _ => (status, message_for(status, &err)),
    }
}

fn kind_to_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientStock | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal details are logged, never returned.
fn message_for(status: StatusCode, err: &dyn std::error::Error) -> serde_json::Value {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "internal server error");
        error_body("Internal server error".to_string())
    } else {
        error_body(err.to_string())
    }
}

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Reservation(ReservationError::Domain(err))
    }
}
