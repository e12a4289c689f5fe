use crate::domain::saga::outcome::{SagaFailure, SagaOutcome, TransferSummary};
use crate::domain::saga::phase::SagaPhase;
use crate::domain::saga::signal::ApprovalSignal;
use crate::domain::step::{StepKind, StepOutcome};
use crate::domain::transfer::TransferRequest;
use crate::foundation::{ApproverId, ReferenceId, Result, SagaError, TransactionId, NANOS_PER_MILLI};
use serde::{Deserialize, Serialize};

/// Durable state of one transfer saga.
///
/// `approved` moves from false to true at most once and is the only field written from outside the
/// orchestrator. Everything else changes through step outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaState {
    pub request: TransferRequest,
    pub phase: SagaPhase,
    pub approved: bool,
    pub approver: Option<ApproverId>,
    pub verification_status: Option<String>,
    pub authorization_status: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub failure: Option<SagaFailure>,
    pub created_at_nanos: u64,
    pub phase_started_at_nanos: u64,
    pub updated_at_nanos: u64,
}

impl SagaState {
    pub fn new(request: TransferRequest, now_nanos: u64) -> Self {
        Self {
            request,
            phase: SagaPhase::Verifying,
            approved: false,
            approver: None,
            verification_status: None,
            authorization_status: None,
            transaction_id: None,
            failure: None,
            created_at_nanos: now_nanos,
            phase_started_at_nanos: now_nanos,
            updated_at_nanos: now_nanos,
        }
    }

    pub fn reference_id(&self) -> &ReferenceId {
        self.request.reference_id()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn phase_elapsed_ms(&self, now_nanos: u64) -> u64 {
        now_nanos.saturating_sub(self.phase_started_at_nanos) / NANOS_PER_MILLI
    }

    /// Applies the final outcome of `step` and returns the phase entered.
    pub fn record_step_outcome(&mut self, step: StepKind, outcome: &StepOutcome, now_nanos: u64) -> Result<SagaPhase> {
        if self.phase.step() != Some(step) {
            return Err(SagaError::invalid_transition(self.phase, step));
        }

        let target = match outcome {
            StepOutcome::Success(payload) => {
                match step {
                    StepKind::Verify => self.verification_status = Some(payload.status.clone()),
                    StepKind::Authorize => self.authorization_status = Some(payload.status.clone()),
                    StepKind::Send => self.transaction_id = payload.transaction_id.clone(),
                }
                SagaPhase::after_success(step)
            }
            failed => {
                let kind = failed.failure_kind().ok_or_else(|| SagaError::invalid_transition(self.phase, SagaPhase::Failed))?;
                let attempts = match failed {
                    StepOutcome::TransportFailure { attempts, .. } => *attempts,
                    _ => 1,
                };
                self.failure = Some(SagaFailure {
                    phase: self.phase,
                    step,
                    kind,
                    reason: failed.reason().unwrap_or_default().to_string(),
                    attempts,
                });
                SagaPhase::Failed
            }
        };

        self.transition_to(target, now_nanos)?;
        Ok(target)
    }

    /// Records an approval. Returns false when the saga was already approved or has finished.
    pub fn apply_approval(&mut self, signal: &ApprovalSignal, now_nanos: u64) -> bool {
        if self.approved || self.is_terminal() {
            return false;
        }
        self.approved = true;
        self.approver = Some(signal.approver.clone());
        self.updated_at_nanos = now_nanos;
        true
    }

    /// Authorization succeeded and a human approved: the only state in which funds may move.
    pub fn ready_to_send(&self) -> bool {
        self.phase == SagaPhase::AwaitingApproval && self.approved && self.authorization_status.is_some()
    }

    pub fn begin_sending(&mut self, now_nanos: u64) -> Result<()> {
        if !self.ready_to_send() {
            return Err(SagaError::invalid_transition(self.phase, SagaPhase::Sending));
        }
        self.transition_to(SagaPhase::Sending, now_nanos)
    }

    pub fn outcome(&self) -> Option<SagaOutcome> {
        match self.phase {
            SagaPhase::Completed => Some(SagaOutcome::Completed(TransferSummary {
                reference_id: self.reference_id().clone(),
                transaction_id: self.transaction_id.clone()?,
                amount: self.request.amount(),
                approver: self.approver.clone()?,
                verification_status: self.verification_status.clone()?,
                authorization_status: self.authorization_status.clone()?,
            })),
            SagaPhase::Failed => self.failure.clone().map(SagaOutcome::Failed),
            _ => None,
        }
    }

    fn transition_to(&mut self, target: SagaPhase, now_nanos: u64) -> Result<()> {
        if !self.phase.can_transition_to(target) {
            return Err(SagaError::invalid_transition(self.phase, target));
        }
        self.phase = target;
        self.phase_started_at_nanos = now_nanos;
        self.updated_at_nanos = now_nanos;
        Ok(())
    }
}
