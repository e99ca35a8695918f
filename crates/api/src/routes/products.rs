//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{NewProduct, Product};
use inventory_store::InventoryStore;
use serde::Serialize;

use super::{AppState, parse_product_id};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct ProductDeletedResponse {
    pub message: &'static str,
    pub product: Product,
}

/// POST /products: create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Product name is required".to_string()));
    }
    let product = state.workflow.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products: list all products.
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.workflow.list_products().await?))
}

/// GET /products/{id}
pub async fn get<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(&id)?;
    Ok(Json(state.workflow.get_product(product_id).await?))
}

/// DELETE /products/{id}: refused while pending cart lines hold stock.
#[tracing::instrument(skip(state))]
pub async fn delete<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDeletedResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let product = state.workflow.delete_product(product_id).await?;
    Ok(Json(ProductDeletedResponse {
        message: "Product deleted successfully",
        product,
    }))
}
