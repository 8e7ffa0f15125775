//! Prometheus metrics endpoint and HTTP request tracking middleware.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

use crate::db::repository::{phones, users};
use crate::AppState;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const USERS_REGISTERED_TOTAL: &str = "users_registered_total";
pub const ORDERS_PLACED_TOTAL: &str = "orders_placed_total";
pub const PAYMENTS_CREATED_TOTAL: &str = "payments_created_total";
pub const USERS: &str = "users";
pub const PHONES: &str = "phones";

/// Install the Prometheus recorder. Call once during startup.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests received");
    describe_histogram!(HTTP_REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
    describe_counter!(USERS_REGISTERED_TOTAL, "Accounts opened through registration");
    describe_counter!(ORDERS_PLACED_TOTAL, "Orders placed");
    describe_counter!(PAYMENTS_CREATED_TOTAL, "Payments created, by paid status");
    describe_gauge!(USERS, "Number of user accounts");
    describe_gauge!(PHONES, "Number of phones in the catalog");

    Ok(handle)
}

/// GET /metrics - Prometheus text format, no authentication
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    update_gauge_metrics(&state).await;

    match state.metrics_handle.as_ref() {
        Some(h) => (StatusCode::OK, h.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics not initialized".to_string(),
        ),
    }
}

async fn update_gauge_metrics(state: &AppState) {
    if let Ok(count) = users::count(&state.db).await {
        gauge!(USERS).set(count as f64);
    }
    if let Ok(count) = phones::count(&state.db).await {
        gauge!(PHONES).set(count as f64);
    }
}

/// Record request count and latency, labelled by the matched route
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

pub fn record_user_registered() {
    counter!(USERS_REGISTERED_TOTAL).increment(1);
}

pub fn record_order_placed() {
    counter!(ORDERS_PLACED_TOTAL).increment(1);
}

pub fn record_payment_created(paid: bool) {
    let status = if paid { "paid" } else { "unpaid" };
    counter!(PAYMENTS_CREATED_TOTAL, "status" => status).increment(1);
}
