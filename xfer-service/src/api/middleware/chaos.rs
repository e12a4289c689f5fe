use crate::api::state::GatewayState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use xfer_core::foundation::{INJECTED_HEADER, INJECTED_MARKER_FIELD};

/// Paths that are never delayed or failed.
const CHAOS_EXEMPT_PATHS: &[&str] = &["/health", "/metrics"];

/// Delays and fails requests per the chaos table before they reach a stub.
pub async fn chaos_middleware(State(state): State<Arc<GatewayState>>, req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if CHAOS_EXEMPT_PATHS.contains(&path.as_str()) {
        return next.run(req).await;
    }

    let decision = state.chaos.decide(&path);
    if !decision.delay.is_zero() {
        tokio::time::sleep(decision.delay).await;
    }

    if let Some(code) = decision.inject {
        info!("chaos injected failure path={} status={} delay_ms={}", path, code, decision.delay.as_millis());
        state.metrics.inc_gateway_request(&path, "injected");
        state.metrics.inc_chaos_injected(code);
        return injected_response(code);
    }

    debug!("chaos forwarding request path={} delay_ms={}", path, decision.delay.as_millis());
    state.metrics.inc_gateway_request(&path, "forwarded");
    next.run(req).await
}

fn injected_response(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = serde_json::Map::new();
    body.insert("detail".to_string(), Value::from(format!("Simulated {} error", status.as_u16())));
    body.insert(INJECTED_MARKER_FIELD.to_string(), Value::Bool(true));
    let mut response = (status, Json(Value::Object(body))).into_response();
    response.headers_mut().insert(INJECTED_HEADER, HeaderValue::from_static("true"));
    response
}
