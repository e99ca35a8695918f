//! Aggregate report endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use inventory_store::InventoryStore;
use reports::TopSeller;
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalQuantityResponse {
    pub total_quantity: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStockResponse {
    pub total_stock: u64,
}

/// GET /reports/total-quantity: units held by purchase lines.
pub async fn total_quantity<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TotalQuantityResponse>, ApiError> {
    let total_quantity = state.reports.total_quantity().await?;
    Ok(Json(TotalQuantityResponse { total_quantity }))
}

/// GET /reports/top-selling
pub async fn top_selling<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TopSeller>, ApiError> {
    Ok(Json(state.reports.top_selling_product().await?))
}

/// GET /reports/total-stock: units still available across products.
pub async fn total_stock<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TotalStockResponse>, ApiError> {
    let total_stock = state.reports.total_stock().await?;
    Ok(Json(TotalStockResponse { total_stock }))
}
