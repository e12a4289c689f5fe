use super::handlers::health::{handle_gateway_health, handle_gateway_metrics, handle_saga_health, handle_saga_metrics};
use super::handlers::sagas::{approve_saga, get_saga, get_saga_result, start_saga};
use super::handlers::stubs::{handle_authorize_payment, handle_dummy, handle_send_crypto, handle_verify_wallet};
use super::middleware::chaos::chaos_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::state::{GatewayState, SagaApiState};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use xfer_core::foundation::{SagaError, ROUTE_AUTHORIZE_PAYMENT, ROUTE_DUMMY, ROUTE_SEND_CRYPTO, ROUTE_VERIFY_WALLET};

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Remote service stubs behind the chaos middleware. `/health` and `/metrics` bypass chaos.
pub fn build_gateway_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(ROUTE_DUMMY, get(handle_dummy))
        .route(ROUTE_AUTHORIZE_PAYMENT, post(handle_authorize_payment))
        .route(ROUTE_VERIFY_WALLET, post(handle_verify_wallet))
        .route(ROUTE_SEND_CRYPTO, post(handle_send_crypto))
        .route("/health", get(handle_gateway_health))
        .route("/metrics", get(handle_gateway_metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn_with_state(state.clone(), chaos_middleware))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}

pub fn build_saga_router(state: Arc<SagaApiState>) -> Router {
    Router::new()
        .route("/sagas", post(start_saga))
        .route("/sagas/:reference_id", get(get_saga))
        .route("/sagas/:reference_id/approve", post(approve_saga))
        .route("/sagas/:reference_id/result", get(get_saga_result))
        .route("/health", get(handle_saga_health))
        .route("/metrics", get(handle_saga_metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}

pub async fn run_gateway_server(addr: SocketAddr, state: Arc<GatewayState>) -> Result<(), SagaError> {
    let listener = bind(addr, "gateway").await?;
    serve_router(listener, build_gateway_router(state), "gateway").await
}

pub async fn run_saga_server(addr: SocketAddr, state: Arc<SagaApiState>) -> Result<(), SagaError> {
    let listener = bind(addr, "saga api").await?;
    serve_router(listener, build_saga_router(state), "saga api").await
}

async fn bind(addr: SocketAddr, name: &str) -> Result<TcpListener, SagaError> {
    info!("binding {} server addr={}", name, addr);
    TcpListener::bind(addr).await.map_err(|err| SagaError::transport(format!("bind {} {}", name, addr), err))
}

/// Serves an already-bound listener, so callers (and tests) can bind port 0 and read the real address first.
pub async fn serve_router(listener: TcpListener, app: Router, name: &str) -> Result<(), SagaError> {
    let addr = listener.local_addr().map_err(|err| SagaError::transport(format!("{} local_addr", name), err))?;
    info!("HTTP server ready and accepting connections server={} addr={}", name, addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.map_err(|err| {
        error!("HTTP server terminated unexpectedly server={} addr={} error={}", name, addr, err);
        SagaError::Message(err.to_string())
    })
}
