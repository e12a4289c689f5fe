use super::{call, gateway_state};
use serde_json::json;
use xfer_core::domain::{ChaosConfig, RouteChaos};
use xfer_core::infrastructure::config::StubMode;
use xfer_service::api::build_gateway_router;
use xfer_service::service::stubs::{StubRoute, VERIFY_REJECTION_DETAIL};

fn verify_body() -> serde_json::Value {
    json!({ "wallet_id": "0x00100", "reference_id": "12345" })
}

#[tokio::test]
async fn test_gateway_when_error_rate_is_one_then_stub_never_runs() {
    let chaos = ChaosConfig::quiet().with_route("/verify_wallet", RouteChaos::new(0, 1.0, &[503]));
    let state = gateway_state(chaos, StubMode::AlwaysSucceed);
    let router = build_gateway_router(state.clone());

    for _ in 0..5 {
        let reply = call(&router, "POST", "/verify_wallet", Some(verify_body())).await;
        assert_eq!(reply.status.as_u16(), 503);
        assert_eq!(reply.headers.get("x-chaos-injected").and_then(|v| v.to_str().ok()), Some("true"));
        assert_eq!(reply.body["detail"], "Simulated 503 error");
        assert_eq!(reply.body["injected"], true);
    }
    assert_eq!(state.stubs.call_count(StubRoute::Verify), 0);
    assert_eq!(state.metrics.gateway_requests("/verify_wallet", "injected"), 5);
}

#[tokio::test]
async fn test_gateway_when_health_or_metrics_then_chaos_is_bypassed() {
    let chaos = ChaosConfig { default: RouteChaos::new(0, 1.0, &[500]), ..ChaosConfig::quiet() };
    let router = build_gateway_router(gateway_state(chaos, StubMode::AlwaysSucceed));

    let health = call(&router, "GET", "/health", None).await;
    assert_eq!(health.status.as_u16(), 200);
    assert_eq!(health.body["status"], "healthy");

    let metrics = call(&router, "GET", "/metrics", None).await;
    assert_eq!(metrics.status.as_u16(), 200);

    let dummy = call(&router, "GET", "/dummy", None).await;
    assert_eq!(dummy.status.as_u16(), 500);
}

#[tokio::test]
async fn test_stub_when_field_missing_then_fixed_malformed_error() {
    let state = gateway_state(ChaosConfig::quiet(), StubMode::AlwaysSucceed);
    let router = build_gateway_router(state.clone());

    let reply = call(&router, "POST", "/verify_wallet", Some(json!({ "wallet_id": "0x00100" }))).await;
    assert_eq!(reply.status.as_u16(), 422);
    assert!(reply.body["detail"].as_str().unwrap_or_default().starts_with("malformed request:"));
    assert!(reply.headers.get("x-chaos-injected").is_none());

    let blank = call(&router, "POST", "/authorize_payment", Some(json!({ "card_number": " ", "reference_id": "12345" }))).await;
    assert_eq!(blank.status.as_u16(), 422);
    assert_eq!(blank.body["detail"], "malformed request: card_number must not be empty");

    assert_eq!(state.stubs.call_count(StubRoute::Verify), 1);
    assert_eq!(state.metrics.stub_calls("/verify_wallet", "malformed"), 1);
}

#[tokio::test]
async fn test_stub_when_always_reject_then_domain_rejection_400() {
    let router = build_gateway_router(gateway_state(ChaosConfig::quiet(), StubMode::AlwaysReject));

    let reply = call(&router, "POST", "/verify_wallet", Some(verify_body())).await;
    assert_eq!(reply.status.as_u16(), 400);
    assert_eq!(reply.body["detail"], VERIFY_REJECTION_DETAIL);
    assert!(reply.body.get("injected").is_none());
}

#[tokio::test]
async fn test_stub_when_success_then_payload_matches_wire_contract() {
    let router = build_gateway_router(gateway_state(ChaosConfig::quiet(), StubMode::AlwaysSucceed));

    let verify = call(&router, "POST", "/verify_wallet", Some(verify_body())).await;
    assert_eq!(verify.body, json!({ "status": "verified", "reference_id": "12345" }));

    let authorize =
        call(&router, "POST", "/authorize_payment", Some(json!({ "card_number": "1234567890123456", "reference_id": "12345" }))).await;
    assert_eq!(authorize.body, json!({ "status": "authorized", "reference_id": "12345" }));

    let send = call(
        &router,
        "POST",
        "/send_crypto",
        Some(json!({ "source_wallet_id": "0x11001", "dest_wallet_id": "0x00100", "reference_id": "12345" })),
    )
    .await;
    assert_eq!(send.status.as_u16(), 200);
    assert_eq!(send.body["status"], "sent");
    assert_eq!(send.body["reference_id"], "12345");
    assert!(send.body["transaction_id"].as_str().unwrap_or_default().starts_with("txn_"));

    let dummy = call(&router, "GET", "/dummy", None).await;
    assert_eq!(dummy.body["message"], "This is a dummy response.");
}

#[tokio::test]
async fn test_gateway_when_seed_fixed_then_injection_sequence_repeats() {
    let chaos = ChaosConfig::quiet().with_route("/verify_wallet", RouteChaos::new(0, 0.5, &[500, 502]));
    let first = build_gateway_router(gateway_state(chaos.clone(), StubMode::AlwaysSucceed));
    let second = build_gateway_router(gateway_state(chaos, StubMode::AlwaysSucceed));

    let mut a = Vec::new();
    let mut b = Vec::new();
    for _ in 0..20 {
        a.push(call(&first, "POST", "/verify_wallet", Some(verify_body())).await.status.as_u16());
        b.push(call(&second, "POST", "/verify_wallet", Some(verify_body())).await.status.as_u16());
    }
    assert_eq!(a, b);
    assert!(a.contains(&200));
}

#[tokio::test(start_paused = true)]
async fn test_gateway_when_route_has_delay_then_response_waits() {
    let chaos = ChaosConfig::quiet().with_route("/dummy", RouteChaos::new(1_000, 0.0, &[500]));
    let router = build_gateway_router(gateway_state(chaos, StubMode::AlwaysSucceed));

    let started = tokio::time::Instant::now();
    let reply = call(&router, "GET", "/dummy", None).await;
    assert_eq!(reply.status.as_u16(), 200);
    assert!(started.elapsed() >= std::time::Duration::from_millis(1_000));
}

#[tokio::test]
async fn test_gateway_when_request_id_sent_then_echoed() {
    let router = build_gateway_router(gateway_state(ChaosConfig::quiet(), StubMode::AlwaysSucceed));
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/dummy")
        .header("x-request-id", "req-77")
        .body(axum::body::Body::empty())
        .expect("request");
    let response = tower::ServiceExt::oneshot(router, request).await.expect("response");
    assert_eq!(response.headers().get("x-request-id").and_then(|v| v.to_str().ok()), Some("req-77"));
}
