//! Test-drive appointment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use domain::{Appointment, CartLine};
use inventory_store::InventoryStore;
use reports::CartLineView;
use serde::Deserialize;

use super::{AppState, parse_product_id};
use crate::error::ApiError;
use crate::extract::UserIdentity;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub product_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub phone_number: String,
}

/// POST /appointments: book a test drive; stock is not reserved.
#[tracing::instrument(skip(state, req))]
pub async fn book<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    UserIdentity(user_id): UserIdentity,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<CartLine>), ApiError> {
    let product_id = parse_product_id(&req.product_id)?;
    let appointment = Appointment::new(req.date, req.location, req.phone_number)?;
    let line = state
        .workflow
        .book_appointment(user_id, product_id, appointment)
        .await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// GET /appointments
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    Ok(Json(state.reports.appointments().await?))
}
