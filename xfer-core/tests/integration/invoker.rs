use crate::fixtures::{fast_policy, transfer_request, RecordingObserver};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use xfer_core::application::StepInvoker;
use xfer_core::domain::{FailureKind, RetryPolicy, StepKind, StepOutcome};
use xfer_core::infrastructure::rpc::{ScriptedReply, ScriptedTransport};

fn invoker(transport: &Arc<ScriptedTransport>) -> (StepInvoker, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    (StepInvoker::new(transport.clone(), observer.clone()), observer)
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_transport_keeps_failing_then_stops_at_max_attempts() {
    let transport = Arc::new(ScriptedTransport::new());
    for _ in 0..5 {
        transport.push(StepKind::Verify, ScriptedReply::injected(503));
    }
    let (invoker, observer) = invoker(&transport);

    let outcome = invoker.invoke(StepKind::Verify, &transfer_request(), &fast_policy()).await;

    assert!(matches!(outcome, StepOutcome::TransportFailure { attempts: 3, .. }), "{outcome:?}");
    assert_eq!(transport.call_count(StepKind::Verify), 3);
    assert_eq!(observer.attempts.lock().clone(), vec![(StepKind::Verify, 1), (StepKind::Verify, 2), (StepKind::Verify, 3)]);
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_domain_rejection_then_no_retry() {
    let transport = Arc::new(ScriptedTransport::new().with(StepKind::Authorize, ScriptedReply::rejected("Payment authorization failed")));
    let (invoker, _) = invoker(&transport);

    let outcome = invoker.invoke(StepKind::Authorize, &transfer_request(), &fast_policy()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::DomainRejection));
    assert_eq!(outcome.reason(), Some("Payment authorization failed"));
    assert_eq!(transport.call_count(StepKind::Authorize), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_malformed_request_then_no_retry() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with(StepKind::Send, ScriptedReply::status(422, serde_json::json!({"detail": "malformed request: amount"}))),
    );
    let (invoker, _) = invoker(&transport);

    let outcome = invoker.invoke(StepKind::Send, &transfer_request(), &fast_policy()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::MalformedRequest));
    assert_eq!(transport.call_count(StepKind::Send), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_transient_then_recovers_on_retry() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with(StepKind::Send, ScriptedReply::injected(502))
            .with(StepKind::Send, ScriptedReply::Error("connection reset".to_string())),
    );
    let (invoker, _) = invoker(&transport);

    let outcome = invoker.invoke(StepKind::Send, &transfer_request(), &fast_policy()).await;

    match outcome {
        StepOutcome::Success(payload) => assert!(payload.transaction_id.is_some()),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(transport.call_count(StepKind::Send), 3);
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_retrying_then_backoff_is_linear_and_capped() {
    let transport = Arc::new(ScriptedTransport::new());
    for _ in 0..4 {
        transport.push(StepKind::Verify, ScriptedReply::injected(500));
    }
    let (invoker, _) = invoker(&transport);
    let policy = RetryPolicy { max_attempts: 4, attempt_timeout_ms: 5_000, backoff_base_ms: 500, backoff_cap_ms: 1_200 };

    let started = Instant::now();
    let outcome = invoker.invoke(StepKind::Verify, &transfer_request(), &policy).await;
    let elapsed = started.elapsed();

    assert!(outcome.is_retryable());
    // 1000 + 1200 (capped) + 1200 (capped)
    assert!(elapsed >= Duration::from_millis(3_400), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3_500), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_invoker_when_remote_stalls_then_attempt_times_out() {
    let transport = Arc::new(ScriptedTransport::new().with(StepKind::Verify, ScriptedReply::Stall));
    let (invoker, _) = invoker(&transport);
    let policy = fast_policy();

    let started = Instant::now();
    let outcome = invoker.invoke(StepKind::Verify, &transfer_request(), &policy).await;

    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(transport.call_count(StepKind::Verify), 2);
    assert!(started.elapsed() >= policy.attempt_timeout() + policy.backoff_before(2));
}
