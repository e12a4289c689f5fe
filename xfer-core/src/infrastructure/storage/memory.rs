use crate::domain::{ApprovalSignal, SagaState};
use crate::foundation::{ReferenceId, Result, SagaError};
use crate::infrastructure::storage::SagaStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    active: HashMap<ReferenceId, SagaState>,
    archived: HashMap<ReferenceId, SagaState>,
    signals: HashMap<ReferenceId, ApprovalSignal>,
}

/// Process-local store. State is lost on restart.
#[derive(Default)]
pub struct MemorySagaStore {
    inner: Mutex<MemoryInner>,
}

impl MemorySagaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner.lock().map_err(|_| SagaError::storage("memory saga store lock", "poisoned"))
    }
}

impl SagaStore for MemorySagaStore {
    fn insert_if_absent(&self, state: &SagaState) -> Result<bool> {
        let mut inner = self.lock_inner()?;
        let reference_id = state.reference_id();
        if inner.active.contains_key(reference_id) || inner.archived.contains_key(reference_id) {
            return Ok(false);
        }
        inner.active.insert(reference_id.clone(), state.clone());
        Ok(true)
    }

    fn load(&self, reference_id: &ReferenceId) -> Result<Option<SagaState>> {
        let inner = self.lock_inner()?;
        Ok(inner.active.get(reference_id).or_else(|| inner.archived.get(reference_id)).cloned())
    }

    fn save(&self, state: &SagaState) -> Result<()> {
        self.lock_inner()?.active.insert(state.reference_id().clone(), state.clone());
        Ok(())
    }

    fn archive(&self, state: &SagaState) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.active.remove(state.reference_id());
        inner.signals.remove(state.reference_id());
        inner.archived.insert(state.reference_id().clone(), state.clone());
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<SagaState>> {
        let inner = self.lock_inner()?;
        Ok(inner.active.values().filter(|state| !state.is_terminal()).cloned().collect())
    }

    fn record_signal(&self, reference_id: &ReferenceId, signal: &ApprovalSignal) -> Result<bool> {
        let mut inner = self.lock_inner()?;
        if inner.signals.contains_key(reference_id) || inner.archived.contains_key(reference_id) {
            return Ok(false);
        }
        inner.signals.insert(reference_id.clone(), signal.clone());
        Ok(true)
    }

    fn pending_signal(&self, reference_id: &ReferenceId) -> Result<Option<ApprovalSignal>> {
        Ok(self.lock_inner()?.signals.get(reference_id).cloned())
    }

    fn health_check(&self) -> Result<()> {
        self.lock_inner().map(|_| ())
    }
}
