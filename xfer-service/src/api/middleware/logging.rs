use super::correlation::CorrelationId;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, error, trace, warn};
use std::net::SocketAddr;
use std::time::Instant;
use xfer_core::foundation::INJECTED_HEADER;

const MAX_HEADER_VALUE_LEN: usize = 128;
const REDACTED_HEADERS: &[&str] = &["authorization", "cookie"];

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let val = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_string()
            } else {
                match value.to_str() {
                    Ok(s) if s.len() > MAX_HEADER_VALUE_LEN => format!("{}...", &s[..MAX_HEADER_VALUE_LEN]),
                    Ok(s) => s.to_string(),
                    Err(_) => "<non-utf8>".to_string(),
                }
            };
            (name.as_str().to_string(), val)
        })
        .collect()
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0)
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_default();
    let correlation_id = req.extensions().get::<CorrelationId>().map(|id| id.0.clone()).unwrap_or_default();
    trace!(
        "request headers correlation_id={} method={} path={} headers={:?}",
        correlation_id,
        method,
        path,
        sanitize_headers(req.headers())
    );
    let request_body_size = content_length(req.headers());
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    let injected = response.headers().contains_key(INJECTED_HEADER);

    if matches!(path.as_str(), "/health" | "/metrics") {
        trace!("health check correlation_id={} path={} status={} duration_ms={}", correlation_id, path, status, duration_ms);
    } else if response.status().is_server_error() {
        if injected {
            debug!(
                "request failed by chaos correlation_id={} client_ip={} method={} path={} status={} duration_ms={}",
                correlation_id, client_ip, method, path, status, duration_ms
            );
        } else {
            error!(
                "request failed correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={}",
                correlation_id, client_ip, method, path, status, duration_ms, request_body_size
            );
        }
    } else if response.status().is_client_error() {
        warn!(
            "request rejected correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={}",
            correlation_id, client_ip, method, path, status, duration_ms, request_body_size
        );
    } else {
        debug!(
            "request correlation_id={} client_ip={} method={} path={} status={} duration_ms={} response_body_size={}",
            correlation_id,
            client_ip,
            method,
            path,
            status,
            duration_ms,
            content_length(response.headers())
        );
    }

    response
}
