//! Cart endpoints backed by the reservation workflow.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use inventory_store::InventoryStore;
use reports::CartLineView;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_line_id, parse_product_id};
use crate::error::ApiError;
use crate::extract::UserIdentity;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreStockRequest {
    pub product_id: String,
    pub quantity_to_restore: i64,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub message: &'static str,
    pub cart_line_id: String,
    pub updated_stock: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLineResponse {
    pub message: &'static str,
    pub restored: bool,
    pub updated_stock: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub message: &'static str,
    pub updated_stock: u32,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub updated: u64,
}

// -- Handlers --

/// POST /cart: reserve stock into a new cart line.
#[tracing::instrument(skip(state, req))]
pub async fn add<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    UserIdentity(user_id): UserIdentity,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<AddToCartResponse>), ApiError> {
    let product_id = parse_product_id(&req.product_id)?;
    let added = state
        .workflow
        .add_to_cart(user_id, product_id, req.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddToCartResponse {
            message: "Product added to cart",
            cart_line_id: added.line.id.to_string(),
            updated_stock: added.updated_stock,
        }),
    ))
}

/// GET /cart: the caller's pending and paid lines.
pub async fn user_cart<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    UserIdentity(user_id): UserIdentity,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    Ok(Json(state.reports.user_cart(user_id).await?))
}

/// GET /cart/all: every cart line, for administrators.
pub async fn all<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    Ok(Json(state.reports.all_lines().await?))
}

/// DELETE /cart/{id}: remove a line and return its stock.
#[tracing::instrument(skip(state))]
pub async fn remove<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RemoveCartLineResponse>, ApiError> {
    let line_id = parse_line_id(&id)?;
    let removed = state.workflow.remove_cart_line(line_id).await?;
    let message = if removed.restored {
        "Cart line removed and stock restored"
    } else {
        "Cart line removed"
    };
    Ok(Json(RemoveCartLineResponse {
        message,
        restored: removed.restored,
        updated_stock: removed.updated_stock,
    }))
}

/// POST /cart/stock: administrative stock correction.
#[tracing::instrument(skip(state, req))]
pub async fn restore_stock<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RestoreStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product_id = parse_product_id(&req.product_id)?;
    let updated_stock = state
        .workflow
        .adjust_stock(product_id, req.quantity_to_restore)
        .await?;
    Ok(Json(StockResponse {
        message: "Stock updated",
        updated_stock,
    }))
}

/// POST /cart/checkout: mark the caller's pending lines as paid.
#[tracing::instrument(skip(state))]
pub async fn checkout<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    UserIdentity(user_id): UserIdentity,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let updated = state.workflow.finalize_cart_for_user(user_id).await?;
    Ok(Json(CheckoutResponse {
        message: "Payment status updated",
        updated,
    }))
}
