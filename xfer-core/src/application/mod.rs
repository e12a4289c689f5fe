//! Application layer: orchestration across domain logic and infrastructure I/O.

pub mod driver;
pub mod gate;
pub mod invoker;
pub mod lifecycle;
pub mod orchestrator;

pub use driver::{SagaDriver, SagaHandle, StartDisposition};
pub use gate::ApprovalGate;
pub use invoker::StepInvoker;
pub use lifecycle::{CompositeObserver, NoopObserver, SagaObserver};
pub use orchestrator::SagaOrchestrator;
