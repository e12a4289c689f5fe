use crate::domain::{SagaFailure, SagaPhase, SignalAck, StepKind, StepOutcome, TransferSummary};
use crate::foundation::{ApproverId, ReferenceId};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Hooks fired as sagas progress. Every method defaults to a no-op.
pub trait SagaObserver: Send + Sync {
    fn on_saga_started(&self, _reference_id: &ReferenceId) {}
    fn on_phase_changed(&self, _reference_id: &ReferenceId, _from: SagaPhase, _to: SagaPhase) {}
    fn on_step_attempt(&self, _reference_id: &ReferenceId, _step: StepKind, _attempt: u32) {}
    fn on_step_outcome(&self, _reference_id: &ReferenceId, _step: StepKind, _outcome: &StepOutcome) {}
    fn on_approval(&self, _reference_id: &ReferenceId, _approver: &ApproverId, _ack: SignalAck) {}
    fn on_completed(&self, _reference_id: &ReferenceId, _summary: &TransferSummary) {}
    fn on_failed(&self, _reference_id: &ReferenceId, _failure: &SagaFailure) {}
}

pub struct NoopObserver;

impl SagaObserver for NoopObserver {}

/// Logs every lifecycle event, then fans it out to the registered observers.
pub struct CompositeObserver {
    observers: Vec<Arc<dyn SagaObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SagaObserver>) {
        self.observers.push(observer);
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SagaObserver for CompositeObserver {
    fn on_saga_started(&self, reference_id: &ReferenceId) {
        info!("saga started reference_id={}", reference_id);
        for observer in &self.observers {
            observer.on_saga_started(reference_id);
        }
    }

    fn on_phase_changed(&self, reference_id: &ReferenceId, from: SagaPhase, to: SagaPhase) {
        info!("saga phase changed reference_id={} from={} to={}", reference_id, from, to);
        for observer in &self.observers {
            observer.on_phase_changed(reference_id, from, to);
        }
    }

    fn on_step_attempt(&self, reference_id: &ReferenceId, step: StepKind, attempt: u32) {
        trace!(
            "on_step_attempt dispatch observer_count={} reference_id={} step={} attempt={}",
            self.observers.len(),
            reference_id,
            step,
            attempt
        );
        for observer in &self.observers {
            observer.on_step_attempt(reference_id, step, attempt);
        }
    }

    fn on_step_outcome(&self, reference_id: &ReferenceId, step: StepKind, outcome: &StepOutcome) {
        match outcome.failure_kind() {
            None => debug!("step succeeded reference_id={} step={}", reference_id, step),
            Some(kind) => warn!(
                "step failed reference_id={} step={} kind={} reason={}",
                reference_id,
                step,
                kind,
                outcome.reason().unwrap_or_default()
            ),
        }
        for observer in &self.observers {
            observer.on_step_outcome(reference_id, step, outcome);
        }
    }

    fn on_approval(&self, reference_id: &ReferenceId, approver: &ApproverId, ack: SignalAck) {
        info!("approval signal reference_id={} approver={} ack={}", reference_id, approver, ack.as_str());
        for observer in &self.observers {
            observer.on_approval(reference_id, approver, ack);
        }
    }

    fn on_completed(&self, reference_id: &ReferenceId, summary: &TransferSummary) {
        info!(
            "saga completed reference_id={} transaction_id={} amount={} approver={}",
            reference_id, summary.transaction_id, summary.amount, summary.approver
        );
        for observer in &self.observers {
            observer.on_completed(reference_id, summary);
        }
    }

    fn on_failed(&self, reference_id: &ReferenceId, failure: &SagaFailure) {
        warn!(
            "saga failed reference_id={} phase={} step={} kind={} attempts={} reason={}",
            reference_id, failure.phase, failure.step, failure.kind, failure.attempts, failure.reason
        );
        for observer in &self.observers {
            observer.on_failed(reference_id, failure);
        }
    }
}
