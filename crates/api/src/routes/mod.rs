//! HTTP route handlers and shared state.

pub mod appointments;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;

use common::{CartLineId, ProductId};
use inventory_store::InventoryStore;
use ::reports::ReportService;
use reservation::ReservationWorkflow;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: InventoryStore> {
    pub workflow: ReservationWorkflow<S>,
    pub reports: ReportService<S>,
}

pub(crate) fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    ProductId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid product id: {e}")))
}

pub(crate) fn parse_line_id(id: &str) -> Result<CartLineId, ApiError> {
    CartLineId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid cart line id: {e}")))
}
