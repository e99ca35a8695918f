//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers descriptions for the workflow metrics so they render with help text.
pub fn describe() {
    metrics::describe_counter!("cart_lines_added_total", "Purchase lines added to carts");
    metrics::describe_counter!("cart_lines_removed_total", "Cart lines removed");
    metrics::describe_counter!(
        "stock_reservations_rejected_total",
        "Cart additions refused for insufficient stock"
    );
    metrics::describe_counter!(
        "stock_compensations_total",
        "Stock changes reverted after a failed cart line write"
    );
    metrics::describe_counter!("carts_finalized_total", "Checkouts that paid at least one line");
    metrics::describe_counter!("order_status_updates_total", "Order status changes applied");
    metrics::describe_histogram!(
        "workflow_duration_seconds",
        metrics::Unit::Seconds,
        "Duration of workflow operations"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
