use crate::fixtures::{memory_driver, transfer_request, transfer_request_for, TEST_APPROVER, TEST_DESTINATION_WALLET};
use std::time::Duration;
use xfer_core::application::StartDisposition;
use xfer_core::domain::{FailureKind, SagaOutcome, SagaPhase, SignalAck, StepKind};
use xfer_core::foundation::{ErrorCode, ReferenceId};
use xfer_core::infrastructure::rpc::{ScriptedReply, ScriptedTransport};

#[tokio::test(start_paused = true)]
async fn test_saga_when_all_steps_succeed_and_approved_then_completes() {
    let harness = memory_driver(ScriptedTransport::new());
    let (handle, disposition) = harness.driver.start(transfer_request()).expect("start");
    assert_eq!(disposition, StartDisposition::Started);
    let reference_id = handle.reference_id().clone();

    let ack = harness.driver.signal_approval(&reference_id, TEST_APPROVER).expect("signal");
    assert_eq!(ack, SignalAck::Accepted);

    let outcome = handle.wait().await.expect("outcome");
    let SagaOutcome::Completed(summary) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(summary.transaction_id.as_str(), "txn_0001");
    assert_eq!(summary.approver.as_str(), TEST_APPROVER);

    let calls = harness.transport.calls();
    let steps: Vec<_> = calls.iter().map(|(step, _)| *step).collect();
    assert_eq!(steps, vec![StepKind::Verify, StepKind::Authorize, StepKind::Send]);
    assert_eq!(calls[0].1["wallet_id"], TEST_DESTINATION_WALLET);

    assert_eq!(
        harness.observer.phase_trail(),
        vec![SagaPhase::Authorizing, SagaPhase::AwaitingApproval, SagaPhase::Sending, SagaPhase::Completed]
    );
    let stored = harness.driver.status(&reference_id).expect("status").expect("stored");
    assert_eq!(stored.phase, SagaPhase::Completed);
    assert!(harness.store.list_active().expect("list").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_verify_rejected_then_fails_without_further_calls() {
    let harness = memory_driver(ScriptedTransport::new().with(StepKind::Verify, ScriptedReply::rejected("Wallet verification failed")));
    let (handle, _) = harness.driver.start(transfer_request()).expect("start");
    let reference_id = handle.reference_id().clone();

    let outcome = handle.wait().await.expect("outcome");
    let SagaOutcome::Failed(failure) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(failure.phase, SagaPhase::Verifying);
    assert_eq!(failure.kind, FailureKind::DomainRejection);
    assert_eq!(harness.transport.call_count(StepKind::Authorize), 0);
    assert_eq!(harness.transport.call_count(StepKind::Send), 0);

    let late = harness.driver.signal_approval(&reference_id, TEST_APPROVER).expect("late signal");
    assert_eq!(late, SignalAck::AlreadyFinished);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_never_approved_then_waits_without_sending() {
    let harness = memory_driver(ScriptedTransport::new());
    let (handle, _) = harness.driver.start(transfer_request()).expect("start");

    let waited = harness.driver.await_result_timeout(handle.reference_id(), Duration::from_secs(60)).await.expect("await");
    assert!(waited.is_none());
    assert!(handle.try_result().is_none());

    let state = harness.driver.status(handle.reference_id()).expect("status").expect("state");
    assert_eq!(state.phase, SagaPhase::AwaitingApproval);
    assert!(!state.approved);
    assert_eq!(harness.transport.call_count(StepKind::Send), 0);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_signal_arrives_before_approval_phase_then_is_applied() {
    let slow_verify = ScriptedReply::Delayed(
        Duration::from_millis(100),
        Box::new(ScriptedReply::status(200, serde_json::json!({"status": "verified", "reference_id": "12345"}))),
    );
    let harness = memory_driver(ScriptedTransport::new().with(StepKind::Verify, slow_verify));
    let (handle, _) = harness.driver.start(transfer_request()).expect("start");

    let ack = harness.driver.signal_approval(handle.reference_id(), TEST_APPROVER).expect("early signal");
    assert_eq!(ack, SignalAck::Accepted);
    let state = harness.driver.status(handle.reference_id()).expect("status").expect("state");
    assert_eq!(state.phase, SagaPhase::Verifying);

    let outcome = handle.wait().await.expect("outcome");
    assert!(outcome.is_completed(), "{outcome:?}");
    let steps: Vec<_> = harness.transport.calls().into_iter().map(|(step, _)| step).collect();
    assert_eq!(steps, vec![StepKind::Verify, StepKind::Authorize, StepKind::Send]);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_approved_early_and_authorize_rejected_then_never_sends() {
    let transport = ScriptedTransport::new().with(StepKind::Authorize, ScriptedReply::rejected("Card declined"));
    let harness = memory_driver(transport);
    let (handle, _) = harness.driver.start(transfer_request_for("early-then-declined")).expect("start");

    let ack = harness.driver.signal_approval(handle.reference_id(), TEST_APPROVER).expect("early signal");
    assert_eq!(ack, SignalAck::Accepted);

    let SagaOutcome::Failed(failure) = handle.wait().await.expect("outcome") else {
        panic!("expected failure");
    };
    assert_eq!(failure.phase, SagaPhase::Authorizing);
    assert_eq!(failure.kind, FailureKind::DomainRejection);
    assert_eq!(harness.transport.call_count(StepKind::Send), 0);
    assert!(!harness.observer.phase_trail().contains(&SagaPhase::Sending));
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_finished_then_released_and_answered_from_archive() {
    let harness = memory_driver(ScriptedTransport::new());
    let mut handles = Vec::new();
    for index in 0..20 {
        let (handle, _) = harness.driver.start(transfer_request_for(&format!("released-{index}"))).expect("start");
        handles.push(handle);
    }
    assert_eq!(harness.driver.live_sagas(), 20);

    for handle in &handles {
        harness.driver.signal_approval(handle.reference_id(), TEST_APPROVER).expect("signal");
    }
    let reference_id = handles[0].reference_id().clone();
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.wait().await.expect("outcome"));
    }
    tokio::task::yield_now().await;
    assert_eq!(harness.driver.live_sagas(), 0);

    let archived = harness.driver.await_result(&reference_id).await.expect("archived outcome");
    assert_eq!(archived, outcomes[0]);
    let late = harness.driver.signal_approval(&reference_id, "someone else").expect("late signal");
    assert_eq!(late, SignalAck::AlreadyFinished);

    let (again, disposition) = harness.driver.start(transfer_request_for("released-0")).expect("start again");
    assert_eq!(disposition, StartDisposition::Existing);
    assert_eq!(again.wait().await.expect("outcome"), outcomes[0]);
    assert_eq!(harness.driver.live_sagas(), 0);
    assert_eq!(harness.transport.call_count(StepKind::Send), 20);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_approved_twice_then_first_approver_wins() {
    let harness = memory_driver(ScriptedTransport::new());
    let (handle, _) = harness.driver.start(transfer_request()).expect("start");
    let reference_id = handle.reference_id().clone();

    assert_eq!(harness.driver.signal_approval(&reference_id, "first").expect("first"), SignalAck::Accepted);
    assert_eq!(harness.driver.signal_approval(&reference_id, "second").expect("second"), SignalAck::AlreadyApproved);

    let SagaOutcome::Completed(summary) = handle.wait().await.expect("outcome") else {
        panic!("expected completion");
    };
    assert_eq!(summary.approver.as_str(), "first");
    assert_eq!(harness.transport.call_count(StepKind::Send), 1);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_started_twice_then_second_attaches() {
    let harness = memory_driver(ScriptedTransport::new());
    let (first, first_disposition) = harness.driver.start(transfer_request()).expect("start");
    let (second, second_disposition) = harness.driver.start(transfer_request()).expect("restart");
    assert_eq!(first_disposition, StartDisposition::Started);
    assert_eq!(second_disposition, StartDisposition::Existing);

    harness.driver.signal_approval(first.reference_id(), TEST_APPROVER).expect("signal");
    let a = first.wait().await.expect("first outcome");
    let b = second.wait().await.expect("second outcome");
    assert_eq!(a, b);
    assert_eq!(harness.transport.call_count(StepKind::Verify), 1);

    let (third, third_disposition) = harness.driver.start(transfer_request()).expect("start after completion");
    assert_eq!(third_disposition, StartDisposition::Existing);
    assert_eq!(third.wait().await.expect("third outcome"), a);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_reference_reused_with_other_payload_then_duplicate() {
    let harness = memory_driver(ScriptedTransport::new());
    harness.driver.start(transfer_request()).expect("start");

    let other = xfer_core::domain::TransferRequest::new(
        "0xother",
        "0x00100",
        "1234567890123456",
        xfer_core::domain::Amount::from_whole(1).expect("amount"),
        "12345",
    )
    .expect("request");
    let err = harness.driver.start(other).err().expect("duplicate");
    assert_eq!(err.code(), ErrorCode::DuplicateSaga);
}

#[tokio::test(start_paused = true)]
async fn test_signal_when_reference_unknown_then_unknown_instance() {
    let harness = memory_driver(ScriptedTransport::new());
    let ack = harness.driver.signal_approval(&ReferenceId::from("nope"), TEST_APPROVER).expect("signal");
    assert_eq!(ack, SignalAck::UnknownInstance);
    let err = harness.driver.await_result(&ReferenceId::from("nope")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownSaga);
}

#[tokio::test(start_paused = true)]
async fn test_saga_when_send_transport_exhausted_then_fails_in_sending() {
    let transport = ScriptedTransport::new();
    for _ in 0..3 {
        transport.push(StepKind::Send, ScriptedReply::injected(504));
    }
    let harness = memory_driver(transport);
    let (handle, _) = harness.driver.start(transfer_request_for("send-fails")).expect("start");
    harness.driver.signal_approval(handle.reference_id(), TEST_APPROVER).expect("signal");

    let SagaOutcome::Failed(failure) = handle.wait().await.expect("outcome") else {
        panic!("expected failure");
    };
    assert_eq!(failure.phase, SagaPhase::Sending);
    assert_eq!(failure.kind, FailureKind::TransportFailure);
    assert_eq!(failure.attempts, 3);
}
