#![allow(dead_code)]

mod gateway_test;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use xfer_core::application::SagaDriver;
use xfer_core::domain::{ChaosConfig, RetryPolicy};
use xfer_core::infrastructure::config::{StubConfig, StubMode};
use xfer_core::infrastructure::rpc::ScriptedTransport;
use xfer_core::infrastructure::storage::MemorySagaStore;
use xfer_service::api::{GatewayState, SagaApiState};
use xfer_service::service::chaos::ChaosEngine;
use xfer_service::service::metrics::{Metrics, MetricsObserver};
use xfer_service::service::stubs::StubBackend;

pub const TEST_SEED: u64 = 42;

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).expect("serialize body"))
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    Reply { status, headers, body }
}

pub fn gateway_state(chaos: ChaosConfig, mode: StubMode) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        chaos: Arc::new(ChaosEngine::new(chaos, Some(TEST_SEED))),
        stubs: Arc::new(StubBackend::new(&StubConfig { mode, rejection_rate: 0.2 }, Some(TEST_SEED + 1))),
        metrics: Arc::new(Metrics::new().expect("metrics")),
    })
}

pub fn saga_state(transport: ScriptedTransport) -> Arc<SagaApiState> {
    let metrics = Arc::new(Metrics::new().expect("metrics"));
    let policy = RetryPolicy { max_attempts: 3, attempt_timeout_ms: 200, backoff_base_ms: 10, backoff_cap_ms: 40 };
    let driver = SagaDriver::new(
        Arc::new(MemorySagaStore::new()),
        Arc::new(transport),
        policy,
        Arc::new(MetricsObserver::new(metrics.clone())),
    );
    Arc::new(SagaApiState { driver: Arc::new(driver), metrics, result_wait: Duration::from_secs(5) })
}

pub fn transfer_body(reference_id: &str) -> Value {
    serde_json::json!({
        "source_wallet_id": "0x11001",
        "destination_wallet_id": "0x00100",
        "card_number": "1234567890123456",
        "amount": 250,
        "reference_id": reference_id,
    })
}
