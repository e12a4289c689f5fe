use crate::fixtures::{driver_with_store, transfer_request, transfer_request_for, TEST_APPROVER};
use std::sync::Arc;
use xfer_core::domain::{ApprovalSignal, SagaPhase, SagaState, SignalAck, StepKind, StepOutcome, StepPayload};
use xfer_core::infrastructure::rpc::ScriptedTransport;
use xfer_core::infrastructure::storage::{FileSagaStore, SagaStore};

fn state_awaiting_approval(reference_id: &str) -> SagaState {
    let mut state = SagaState::new(transfer_request_for(reference_id), 1);
    for (step, status) in [(StepKind::Verify, "verified"), (StepKind::Authorize, "authorized")] {
        let payload = StepPayload { status: status.to_string(), reference_id: state.reference_id().clone(), transaction_id: None };
        state.record_step_outcome(step, &StepOutcome::Success(payload), 2).expect("record");
    }
    state
}

#[tokio::test(start_paused = true)]
async fn test_recover_when_saga_parked_on_approval_then_resumes_without_repeating_steps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store: Arc<dyn SagaStore> = Arc::new(FileSagaStore::open(dir.path()).expect("open"));
    let parked = state_awaiting_approval("parked");
    store.insert_if_absent(&parked).expect("insert");

    let harness = driver_with_store(store, ScriptedTransport::new());
    assert_eq!(harness.driver.recover().expect("recover"), 1);
    assert_eq!(harness.driver.recover().expect("recover again"), 0);

    let ack = harness.driver.signal_approval(parked.reference_id(), TEST_APPROVER).expect("signal");
    assert_eq!(ack, SignalAck::Accepted);
    let outcome = harness.driver.await_result(parked.reference_id()).await.expect("outcome");
    assert!(outcome.is_completed());

    let steps: Vec<_> = harness.transport.calls().into_iter().map(|(step, _)| step).collect();
    assert_eq!(steps, vec![StepKind::Send]);
}

#[tokio::test(start_paused = true)]
async fn test_recover_when_signal_persisted_before_restart_then_completes_unprompted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store: Arc<dyn SagaStore> = Arc::new(FileSagaStore::open(dir.path()).expect("open"));
    let parked = state_awaiting_approval("signalled");
    store.insert_if_absent(&parked).expect("insert");
    store.record_signal(parked.reference_id(), &ApprovalSignal::new(TEST_APPROVER, 3)).expect("signal");

    let harness = driver_with_store(store, ScriptedTransport::new());
    harness.driver.recover().expect("recover");
    let outcome = harness.driver.await_result(parked.reference_id()).await.expect("outcome");
    assert_eq!(outcome.transaction_id().map(|id| id.as_str()), Some("txn_0001"));
}

#[tokio::test(start_paused = true)]
async fn test_file_store_when_saga_completes_then_archived_state_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let request = transfer_request();
    {
        let store: Arc<dyn SagaStore> = Arc::new(FileSagaStore::open(dir.path()).expect("open"));
        let harness = driver_with_store(store, ScriptedTransport::new());
        let (handle, _) = harness.driver.start(request.clone()).expect("start");
        harness.driver.signal_approval(handle.reference_id(), TEST_APPROVER).expect("signal");
        handle.wait().await.expect("outcome");
    }

    let store: Arc<dyn SagaStore> = Arc::new(FileSagaStore::open(dir.path()).expect("reopen"));
    assert!(store.list_active().expect("list").is_empty());
    let restarted = driver_with_store(store, ScriptedTransport::new());
    let state = restarted.driver.status(request.reference_id()).expect("status").expect("state");
    assert_eq!(state.phase, SagaPhase::Completed);
    assert_eq!(state.approver.as_ref().map(|approver| approver.as_str()), Some(TEST_APPROVER));
    assert_eq!(std::fs::read_dir(dir.path().join("signals")).expect("signals dir").count(), 0);

    let (handle, _) = restarted.driver.start(request).expect("restart");
    assert!(handle.wait().await.expect("outcome").is_completed());
    assert!(restarted.transport.calls().is_empty());
    assert_eq!(restarted.driver.live_sagas(), 0);
}
