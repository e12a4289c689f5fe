use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried through the extensions of every request.
#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

pub async fn correlation_middleware(mut req: Request<Body>, next: Next) -> Response {
    let inbound = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| HeaderValue::from_str(s).ok());
    let header = inbound.unwrap_or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap_or(HeaderValue::from_static("unknown")));
    let request_id = header.to_str().unwrap_or_default().to_string();

    req.extensions_mut().insert(CorrelationId(request_id));

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, header);
    response
}
