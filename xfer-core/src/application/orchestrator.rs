use crate::application::gate::ApprovalGate;
use crate::application::invoker::StepInvoker;
use crate::application::lifecycle::SagaObserver;
use crate::domain::{RetryPolicy, SagaOutcome, SagaPhase, SagaState};
use crate::foundation::util::time::now_nanos;
use crate::foundation::{Result, SagaError};
use crate::infrastructure::rpc::StepTransport;
use crate::infrastructure::storage::SagaStore;
use log::{debug, info};
use std::sync::Arc;

/// Drives one saga from its current persisted phase to a terminal outcome.
///
/// State is saved after every transition and before the send step starts, so a restarted process
/// resumes from the last completed step instead of repeating it.
pub struct SagaOrchestrator {
    store: Arc<dyn SagaStore>,
    invoker: StepInvoker,
    policy: RetryPolicy,
    observer: Arc<dyn SagaObserver>,
}

impl SagaOrchestrator {
    pub fn new(
        store: Arc<dyn SagaStore>,
        transport: Arc<dyn StepTransport>,
        policy: RetryPolicy,
        observer: Arc<dyn SagaObserver>,
    ) -> Self {
        let invoker = StepInvoker::new(transport, observer.clone());
        Self { store, invoker, policy, observer }
    }

    pub async fn run(&self, mut state: SagaState, gate: &ApprovalGate) -> Result<SagaOutcome> {
        let reference_id = state.reference_id().clone();
        debug!("orchestrator run reference_id={} phase={}", reference_id, state.phase);
        loop {
            if state.is_terminal() {
                let outcome = state.outcome().ok_or_else(|| SagaError::SagaAborted {
                    reference_id: reference_id.to_string(),
                    details: format!("terminal phase {} without a recorded outcome", state.phase),
                })?;
                self.finish(&state, &outcome)?;
                return Ok(outcome);
            }

            if state.phase == SagaPhase::AwaitingApproval {
                if !state.approved {
                    let signal = match self.store.pending_signal(&reference_id)? {
                        Some(signal) => signal,
                        None => {
                            info!("saga waiting for approval reference_id={}", reference_id);
                            gate.wait().await
                        }
                    };
                    state.apply_approval(&signal, now_nanos());
                    self.store.save(&state)?;
                }
                state.begin_sending(now_nanos())?;
                self.store.save(&state)?;
                self.observer.on_phase_changed(&reference_id, SagaPhase::AwaitingApproval, SagaPhase::Sending);
                continue;
            }

            let step = state.phase.step().ok_or_else(|| SagaError::invalid_transition(state.phase, "step"))?;
            let outcome = self.invoker.invoke(step, &state.request, &self.policy).await;
            self.observer.on_step_outcome(&reference_id, step, &outcome);

            let from = state.phase;
            let to = state.record_step_outcome(step, &outcome, now_nanos())?;
            self.store.save(&state)?;
            self.observer.on_phase_changed(&reference_id, from, to);
        }
    }

    fn finish(&self, state: &SagaState, outcome: &SagaOutcome) -> Result<()> {
        self.store.archive(state)?;
        match outcome {
            SagaOutcome::Completed(summary) => self.observer.on_completed(state.reference_id(), summary),
            SagaOutcome::Failed(failure) => self.observer.on_failed(state.reference_id(), failure),
        }
        Ok(())
    }
}
