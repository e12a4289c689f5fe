use crate::domain::step::StepKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SagaPhase {
    #[default]
    Verifying = 0,
    Authorizing = 1,
    AwaitingApproval = 2,
    Sending = 3,
    Completed = 4,
    Failed = 5,
}

impl SagaPhase {
    pub fn can_transition_to(self, target: SagaPhase) -> bool {
        use SagaPhase::*;
        matches!(
            (self, target),
            (Verifying, Authorizing)
                | (Verifying, Failed)
                | (Authorizing, AwaitingApproval)
                | (Authorizing, Failed)
                | (AwaitingApproval, Sending)
                | (Sending, Completed)
                | (Sending, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SagaPhase::Completed | SagaPhase::Failed)
    }

    /// Remote step executed while in this phase.
    pub fn step(self) -> Option<StepKind> {
        match self {
            SagaPhase::Verifying => Some(StepKind::Verify),
            SagaPhase::Authorizing => Some(StepKind::Authorize),
            SagaPhase::Sending => Some(StepKind::Send),
            SagaPhase::AwaitingApproval | SagaPhase::Completed | SagaPhase::Failed => None,
        }
    }

    /// Phase entered when `step` succeeds.
    pub fn after_success(step: StepKind) -> SagaPhase {
        match step {
            StepKind::Verify => SagaPhase::Authorizing,
            StepKind::Authorize => SagaPhase::AwaitingApproval,
            StepKind::Send => SagaPhase::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SagaPhase::Verifying => "verifying",
            SagaPhase::Authorizing => "authorizing",
            SagaPhase::AwaitingApproval => "awaiting_approval",
            SagaPhase::Sending => "sending",
            SagaPhase::Completed => "completed",
            SagaPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for SagaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
