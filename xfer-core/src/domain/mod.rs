//! Domain layer: pure, synchronous saga logic. No I/O and no async runtime.

pub mod chaos;
pub mod retry;
pub mod saga;
pub mod step;
pub mod transfer;

pub use chaos::{ChaosConfig, ChaosDecision, RouteChaos};
pub use retry::RetryPolicy;
pub use saga::{ApprovalSignal, SagaFailure, SagaOutcome, SagaPhase, SagaState, SignalAck, TransferSummary};
pub use step::{classify_response, FailureKind, StepKind, StepOutcome, StepPayload};
pub use transfer::{Amount, TransferRequest};
