use crate::fixtures::{transfer_request, transfer_request_for, TEST_APPROVER};
use xfer_core::domain::{ApprovalSignal, SagaPhase, SagaState, StepKind, StepOutcome};
use xfer_core::foundation::ReferenceId;
use xfer_core::infrastructure::storage::{FileSagaStore, MemorySagaStore, SagaStore};

fn exercise_store(store: &dyn SagaStore) {
    store.health_check().expect("healthy");
    let state = SagaState::new(transfer_request(), 1);
    let reference_id = state.reference_id().clone();

    assert!(store.insert_if_absent(&state).expect("insert"));
    assert!(!store.insert_if_absent(&state).expect("second insert"));
    assert_eq!(store.load(&reference_id).expect("load"), Some(state.clone()));
    assert_eq!(store.list_active().expect("list").len(), 1);

    let signal = ApprovalSignal::new(TEST_APPROVER, 5);
    assert!(store.record_signal(&reference_id, &signal).expect("signal"));
    assert!(!store.record_signal(&reference_id, &ApprovalSignal::new("other", 6)).expect("second signal"));
    assert_eq!(store.pending_signal(&reference_id).expect("pending"), Some(signal));

    let mut failed = state.clone();
    failed
        .record_step_outcome(StepKind::Verify, &StepOutcome::DomainRejection { reason: "no".to_string() }, 7)
        .expect("record");
    store.save(&failed).expect("save");
    store.archive(&failed).expect("archive");

    assert!(store.list_active().expect("list").is_empty());
    assert_eq!(store.pending_signal(&reference_id).expect("pending after archive"), None);
    assert!(!store.record_signal(&reference_id, &ApprovalSignal::new("late", 8)).expect("signal after archive"));
    assert_eq!(store.pending_signal(&reference_id).expect("pending after late signal"), None);
    assert_eq!(store.load(&reference_id).expect("load").map(|s| s.phase), Some(SagaPhase::Failed));
    assert!(!store.insert_if_absent(&state).expect("insert after archive"));
    assert!(store.contains(&reference_id).expect("contains"));
    assert!(!store.contains(&ReferenceId::from("missing")).expect("contains missing"));
}

#[test]
fn test_memory_store_contract() {
    exercise_store(&MemorySagaStore::new());
}

#[test]
fn test_file_store_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSagaStore::open(dir.path()).expect("open");
    exercise_store(&store);
    let leftover_signals = std::fs::read_dir(dir.path().join("signals")).expect("signals dir").count();
    assert_eq!(leftover_signals, 0);
}

#[test]
fn test_file_store_when_reopened_then_state_survives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = SagaState::new(transfer_request_for("ref/with:odd chars"), 1);
    {
        let store = FileSagaStore::open(dir.path()).expect("open");
        store.insert_if_absent(&state).expect("insert");
    }
    let store = FileSagaStore::open(dir.path()).expect("reopen");
    assert_eq!(store.load(state.reference_id()).expect("load"), Some(state.clone()));
    assert_eq!(store.list_active().expect("list"), vec![state]);
}
