use crate::application::gate::ApprovalGate;
use crate::application::lifecycle::SagaObserver;
use crate::application::orchestrator::SagaOrchestrator;
use crate::domain::{ApprovalSignal, RetryPolicy, SagaOutcome, SagaState, SignalAck, TransferRequest};
use crate::foundation::util::time::now_nanos;
use crate::foundation::{ApproverId, ReferenceId, Result, SagaError};
use crate::infrastructure::rpc::StepTransport;
use crate::infrastructure::storage::SagaStore;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

type SagaResult = std::result::Result<SagaOutcome, SagaError>;
type InstanceMap = Arc<Mutex<HashMap<ReferenceId, Arc<SagaInstance>>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartDisposition {
    Started,
    /// A saga with the same reference id and request already exists; the handle points at it.
    Existing,
}

struct SagaInstance {
    request: TransferRequest,
    gate: ApprovalGate,
    result: watch::Sender<Option<SagaResult>>,
}

impl SagaInstance {
    fn new(request: TransferRequest) -> Self {
        let (result, _rx) = watch::channel(None);
        Self { request, gate: ApprovalGate::new(), result }
    }

    fn finish(&self, result: SagaResult) {
        self.result.send_replace(Some(result));
    }

    fn is_finished(&self) -> bool {
        self.result.borrow().is_some()
    }

    fn handle(&self) -> SagaHandle {
        SagaHandle { reference_id: self.request.reference_id().clone(), result: self.result.subscribe() }
    }
}

/// Caller-side view of a running or finished saga.
pub struct SagaHandle {
    reference_id: ReferenceId,
    result: watch::Receiver<Option<SagaResult>>,
}

impl SagaHandle {
    pub fn reference_id(&self) -> &ReferenceId {
        &self.reference_id
    }

    pub fn try_result(&self) -> Option<SagaResult> {
        self.result.borrow().clone()
    }

    pub async fn wait(mut self) -> Result<SagaOutcome> {
        let current = match self.result.wait_for(Option::is_some).await {
            Ok(current) => current.clone(),
            Err(_) => None,
        };
        current.unwrap_or_else(|| {
            Err(SagaError::SagaAborted {
                reference_id: self.reference_id.to_string(),
                details: "saga task ended without a result".to_string(),
            })
        })
    }
}

/// Entry point for starting sagas, delivering approvals and collecting results.
///
/// Only running sagas are held in memory. Once a saga finishes, its entry is released and later
/// lookups are answered from the store's archive.
pub struct SagaDriver {
    store: Arc<dyn SagaStore>,
    orchestrator: Arc<SagaOrchestrator>,
    observer: Arc<dyn SagaObserver>,
    instances: InstanceMap,
}

impl SagaDriver {
    pub fn new(
        store: Arc<dyn SagaStore>,
        transport: Arc<dyn StepTransport>,
        policy: RetryPolicy,
        observer: Arc<dyn SagaObserver>,
    ) -> Self {
        let orchestrator = Arc::new(SagaOrchestrator::new(store.clone(), transport, policy, observer.clone()));
        Self { store, orchestrator, observer, instances: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Number of sagas currently running in this process.
    pub fn live_sagas(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn store(&self) -> &Arc<dyn SagaStore> {
        &self.store
    }

    /// Starts a saga, or attaches to the existing one for the same reference id.
    ///
    /// Reusing a reference id with a different request is refused with `DuplicateSaga`.
    pub fn start(&self, request: TransferRequest) -> Result<(SagaHandle, StartDisposition)> {
        request.validate()?;
        let reference_id = request.reference_id().clone();
        let mut instances = self.instances.lock();

        if let Some(instance) = instances.get(&reference_id) {
            ensure_same_request(&instance.request, &request)?;
            return Ok((instance.handle(), StartDisposition::Existing));
        }

        let state = SagaState::new(request, now_nanos());
        if !self.store.insert_if_absent(&state)? {
            let existing = self.store.load(&reference_id)?.ok_or_else(|| SagaError::UnknownSaga(reference_id.to_string()))?;
            ensure_same_request(&existing.request, &state.request)?;
            let instance = self.attach(&mut instances, existing);
            return Ok((instance.handle(), StartDisposition::Existing));
        }

        self.observer.on_saga_started(&reference_id);
        let instance = self.attach(&mut instances, state);
        Ok((instance.handle(), StartDisposition::Started))
    }

    /// Delivers a human approval. Idempotent: only the first approval per saga is accepted.
    pub fn signal_approval(&self, reference_id: &ReferenceId, approver: impl Into<ApproverId>) -> Result<SignalAck> {
        let approver = approver.into();
        let ack = self.deliver_signal(reference_id, &approver)?;
        self.observer.on_approval(reference_id, &approver, ack);
        Ok(ack)
    }

    fn deliver_signal(&self, reference_id: &ReferenceId, approver: &ApproverId) -> Result<SignalAck> {
        let Some(instance) = self.instance(reference_id)? else {
            return Ok(SignalAck::UnknownInstance);
        };
        if instance.is_finished() {
            return Ok(SignalAck::AlreadyFinished);
        }
        let signal = ApprovalSignal::new(approver.clone(), now_nanos());
        if !self.store.record_signal(reference_id, &signal)? {
            // The saga may have been archived between the finished check and the write.
            let finished = self.store.load(reference_id)?.is_some_and(|state| state.is_terminal());
            return Ok(if finished { SignalAck::AlreadyFinished } else { SignalAck::AlreadyApproved });
        }
        instance.gate.open(signal);
        Ok(SignalAck::Accepted)
    }

    /// Blocks until the saga reaches a terminal phase.
    pub async fn await_result(&self, reference_id: &ReferenceId) -> Result<SagaOutcome> {
        let instance = self.instance(reference_id)?.ok_or_else(|| SagaError::UnknownSaga(reference_id.to_string()))?;
        instance.handle().wait().await
    }

    /// Like `await_result`, but gives up after `limit` and returns `Ok(None)`.
    pub async fn await_result_timeout(&self, reference_id: &ReferenceId, limit: Duration) -> Result<Option<SagaOutcome>> {
        match tokio::time::timeout(limit, self.await_result(reference_id)).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Latest persisted state of a saga, running or finished.
    pub fn status(&self, reference_id: &ReferenceId) -> Result<Option<SagaState>> {
        self.store.load(reference_id)
    }

    /// Resumes every non-terminal saga found in the store. Returns how many were resumed.
    pub fn recover(&self) -> Result<usize> {
        let active = self.store.list_active()?;
        let mut instances = self.instances.lock();
        let mut resumed = 0;
        for state in active {
            if instances.contains_key(state.reference_id()) {
                continue;
            }
            info!("resuming saga reference_id={} phase={}", state.reference_id(), state.phase);
            self.attach(&mut instances, state);
            resumed += 1;
        }
        Ok(resumed)
    }

    /// Returns the live instance for `reference_id`, resuming it from the store if needed.
    fn instance(&self, reference_id: &ReferenceId) -> Result<Option<Arc<SagaInstance>>> {
        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(reference_id) {
            return Ok(Some(instance.clone()));
        }
        match self.store.load(reference_id)? {
            Some(state) => Ok(Some(self.attach(&mut instances, state))),
            None => Ok(None),
        }
    }

    /// Finished sagas get a detached, already-resolved instance; running ones are registered and spawned.
    fn attach(&self, instances: &mut HashMap<ReferenceId, Arc<SagaInstance>>, state: SagaState) -> Arc<SagaInstance> {
        let instance = Arc::new(SagaInstance::new(state.request.clone()));
        if let Some(outcome) = state.outcome() {
            instance.finish(Ok(outcome));
            return instance;
        }
        instances.insert(state.reference_id().clone(), instance.clone());

        let orchestrator = self.orchestrator.clone();
        let registry = self.instances.clone();
        let task_instance = instance.clone();
        tokio::spawn(async move {
            let reference_id = task_instance.request.reference_id().clone();
            let result = orchestrator.run(state, &task_instance.gate).await;
            let archived = match &result {
                Ok(_) => true,
                Err(err) => {
                    error!("saga aborted reference_id={} error={}", reference_id, err);
                    false
                }
            };
            task_instance.finish(result);
            // Aborted sagas stay registered: their stored record is not terminal.
            if archived {
                release(&registry, &reference_id, &task_instance);
            }
        });
        instance
    }
}

fn release(registry: &InstanceMap, reference_id: &ReferenceId, instance: &Arc<SagaInstance>) {
    let mut instances = registry.lock();
    if instances.get(reference_id).is_some_and(|live| Arc::ptr_eq(live, instance)) {
        instances.remove(reference_id);
        debug!("released finished saga reference_id={} live={}", reference_id, instances.len());
    }
}

fn ensure_same_request(existing: &TransferRequest, incoming: &TransferRequest) -> Result<()> {
    if existing == incoming {
        return Ok(());
    }
    warn!("reference id reused with a different request reference_id={}", incoming.reference_id());
    Err(SagaError::DuplicateSaga(incoming.reference_id().to_string()))
}
