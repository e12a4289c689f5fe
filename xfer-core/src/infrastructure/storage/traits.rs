use crate::domain::{ApprovalSignal, SagaState};
use crate::foundation::{ReferenceId, Result};

/// Durable home of saga state and delivered approval signals.
///
/// Terminal sagas are archived rather than deleted so a repeated start for the same reference id still
/// resolves to the outcome it reached the first time.
pub trait SagaStore: Send + Sync {
    /// Stores a fresh saga. Returns `Ok(false)` if the reference id is already known (active or archived).
    fn insert_if_absent(&self, state: &SagaState) -> Result<bool>;

    /// Loads a saga, looking at active state first, then the archive.
    fn load(&self, reference_id: &ReferenceId) -> Result<Option<SagaState>>;

    /// Overwrites the active state of a saga.
    fn save(&self, state: &SagaState) -> Result<()>;

    /// Moves a terminal saga out of the active set and drops its approval signal.
    ///
    /// The approver, if any, is already part of the archived state.
    fn archive(&self, state: &SagaState) -> Result<()>;

    /// Sagas that have not reached a terminal phase.
    fn list_active(&self) -> Result<Vec<SagaState>>;

    /// Records an approval. Only the first signal per saga is kept, and none once the saga is archived;
    /// returns whether this one was.
    fn record_signal(&self, reference_id: &ReferenceId, signal: &ApprovalSignal) -> Result<bool>;

    fn pending_signal(&self, reference_id: &ReferenceId) -> Result<Option<ApprovalSignal>>;

    /// Cheap liveness check for readiness endpoints.
    fn health_check(&self) -> Result<()>;

    fn contains(&self, reference_id: &ReferenceId) -> Result<bool> {
        Ok(self.load(reference_id)?.is_some())
    }
}
