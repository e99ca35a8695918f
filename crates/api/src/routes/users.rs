//! User summary registration.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::UserSummary;
use inventory_store::InventoryStore;

use super::AppState;
use crate::error::ApiError;

/// POST /users: record the display details used by admin listings.
pub async fn register<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<UserSummary>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("User email is required".to_string()));
    }
    let user = state.workflow.register_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
