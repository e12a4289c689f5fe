use crate::api::state::{GatewayState, SagaApiState};
use crate::service::metrics::Metrics;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace};
use std::sync::Arc;

pub async fn handle_gateway_health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    trace!("gateway health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
        "stub_mode": state.stubs.mode(),
        "uptime_secs": state.metrics.uptime().as_secs(),
    }))
}

pub async fn handle_saga_health(State(state): State<Arc<SagaApiState>>) -> Response {
    let storage_ok = match state.driver.store().health_check() {
        Ok(()) => true,
        Err(err) => {
            debug!("saga health check degraded error={}", err);
            false
        }
    };
    let status = if storage_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(serde_json::json!({
            "status": if storage_ok { "healthy" } else { "degraded" },
            "storage_ok": storage_ok,
            "live_sagas": state.driver.live_sagas(),
        })),
    )
        .into_response()
}

pub async fn handle_gateway_metrics(State(state): State<Arc<GatewayState>>) -> Response {
    metrics_response(&state.metrics)
}

pub async fn handle_saga_metrics(State(state): State<Arc<SagaApiState>>) -> Response {
    metrics_response(&state.metrics)
}

fn metrics_response(metrics: &Metrics) -> Response {
    match metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));
            response
        }
        Err(err) => {
            debug!("metrics encode failed error={}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics_error: {}", err)).into_response()
        }
    }
}
