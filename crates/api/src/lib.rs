//! HTTP API server with observability for the inventory and order service.
//!
//! Provides REST endpoints for products, carts, order status, appointments
//! and reports, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::OrderStatusPolicy;
use inventory_store::InventoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use reports::ReportService;
use reservation::ReservationWorkflow;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: InventoryStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", post(routes::products::create::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", delete(routes::products::delete::<S>))
        .route("/users", post(routes::users::register::<S>))
        .route("/cart", post(routes::cart::add::<S>))
        .route("/cart", get(routes::cart::user_cart::<S>))
        .route("/cart/all", get(routes::cart::all::<S>))
        .route("/cart/stock", post(routes::cart::restore_stock::<S>))
        .route("/cart/checkout", post(routes::cart::checkout::<S>))
        .route("/cart/{id}", delete(routes::cart::remove::<S>))
        .route("/orders", get(routes::orders::list_by_status::<S>))
        .route("/orders/status", put(routes::orders::update_status::<S>))
        .route("/orders/{id}/status", get(routes::orders::get_status::<S>))
        .route("/appointments", post(routes::appointments::book::<S>))
        .route("/appointments", get(routes::appointments::list::<S>))
        .route(
            "/reports/total-quantity",
            get(routes::reports::total_quantity::<S>),
        )
        .route("/reports/top-selling", get(routes::reports::top_selling::<S>))
        .route("/reports/total-stock", get(routes::reports::total_stock::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
pub fn create_default_state<S: InventoryStore + Clone + 'static>(
    store: S,
    policy: OrderStatusPolicy,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        workflow: ReservationWorkflow::with_policy(store.clone(), policy),
        reports: ReportService::new(store),
    })
}
