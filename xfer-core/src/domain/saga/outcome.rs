use crate::domain::saga::phase::SagaPhase;
use crate::domain::step::{FailureKind, StepKind};
use crate::domain::transfer::Amount;
use crate::foundation::{ApproverId, ReferenceId, TransactionId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSummary {
    pub reference_id: ReferenceId,
    pub transaction_id: TransactionId,
    pub amount: Amount,
    pub approver: ApproverId,
    pub verification_status: String,
    pub authorization_status: String,
}

/// Why a saga stopped before sending funds, or while sending them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaFailure {
    pub phase: SagaPhase,
    pub step: StepKind,
    pub kind: FailureKind,
    pub reason: String,
    pub attempts: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SagaOutcome {
    Completed(TransferSummary),
    Failed(SagaFailure),
}

impl SagaOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SagaOutcome::Completed(_))
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            SagaOutcome::Completed(summary) => Some(&summary.transaction_id),
            SagaOutcome::Failed(_) => None,
        }
    }
}
