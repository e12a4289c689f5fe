pub mod outcome;
pub mod phase;
pub mod signal;
pub mod state;

pub use outcome::{SagaFailure, SagaOutcome, TransferSummary};
pub use phase::SagaPhase;
pub use signal::{ApprovalSignal, SignalAck};
pub use state::SagaState;
