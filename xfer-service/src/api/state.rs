use crate::service::chaos::ChaosEngine;
use crate::service::metrics::Metrics;
use crate::service::stubs::StubBackend;
use std::sync::Arc;
use std::time::Duration;
use xfer_core::application::SagaDriver;

#[derive(Clone)]
pub struct GatewayState {
    pub chaos: Arc<ChaosEngine>,
    pub stubs: Arc<StubBackend>,
    pub metrics: Arc<Metrics>,
}

#[derive(Clone)]
pub struct SagaApiState {
    pub driver: Arc<SagaDriver>,
    pub metrics: Arc<Metrics>,
    /// Cap applied to `wait_ms` on the result long-poll.
    pub result_wait: Duration,
}
