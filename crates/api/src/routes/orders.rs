//! Order status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domain::{CartLine, OrderStatus};
use inventory_store::InventoryStore;
use reports::CartLineView;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_line_id};
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub cart_item_id: String,
    pub order_status: String,
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatedResponse {
    pub message: &'static str,
    pub cart_item: CartLine,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_status: Option<OrderStatus>,
    pub cart_item: CartLineView,
}

/// PUT /orders/status: advance a purchase line's fulfillment status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdatedResponse>, ApiError> {
    let line_id = parse_line_id(&req.cart_item_id)?;
    let status: OrderStatus = req.order_status.parse()?;
    let cart_item = state
        .workflow
        .advance_order_status(line_id, status)
        .await?;
    Ok(Json(StatusUpdatedResponse {
        message: "Order status updated",
        cart_item,
    }))
}

/// GET /orders/{id}/status
pub async fn get_status<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let line_id = parse_line_id(&id)?;
    let (order_status, cart_item) = state.reports.order_status(line_id).await?;
    Ok(Json(OrderStatusResponse {
        order_status,
        cart_item,
    }))
}

/// GET /orders?status=: lines currently at the given order status.
pub async fn list_by_status<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    let raw = filter
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Order status is required".to_string()))?;
    let status: OrderStatus = raw.parse()?;
    Ok(Json(state.reports.lines_by_status(status).await?))
}
