use log::debug;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use xfer_core::application::SagaObserver;
use xfer_core::domain::{SagaFailure, SignalAck, StepKind, TransferSummary};
use xfer_core::foundation::{ApproverId, ReferenceId, SagaError};

pub struct Metrics {
    registry: Registry,
    gateway_requests_total: IntCounterVec,
    chaos_injected_total: IntCounterVec,
    stub_calls_total: IntCounterVec,
    sagas_total: IntCounterVec,
    step_attempts_total: IntCounterVec,
    approvals_total: IntCounterVec,
    started_at: Instant,
}

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> Result<IntCounterVec, SagaError> {
    IntCounterVec::new(Opts::new(name, help), labels).map_err(|err| SagaError::Message(err.to_string()))
}

impl Metrics {
    pub fn new() -> Result<Self, SagaError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let gateway_requests_total = counter_vec("gateway_requests_total", "Gateway requests by route and outcome", &["route", "outcome"])?;
        let chaos_injected_total = counter_vec("chaos_injected_total", "Faults injected by the gateway", &["code"])?;
        let stub_calls_total = counter_vec("stub_calls_total", "Remote stub calls by route and result", &["route", "result"])?;
        let sagas_total = counter_vec("sagas_total", "Sagas by lifecycle event", &["outcome"])?;
        let step_attempts_total = counter_vec("step_attempts_total", "Remote step attempts", &["step"])?;
        let approvals_total = counter_vec("approvals_total", "Approval signals by acknowledgement", &["ack"])?;

        for collector in [
            &gateway_requests_total,
            &chaos_injected_total,
            &stub_calls_total,
            &sagas_total,
            &step_attempts_total,
            &approvals_total,
        ] {
            registry.register(Box::new(collector.clone())).map_err(|err| SagaError::Message(err.to_string()))?;
        }

        debug!("prometheus metrics registered metric_count=6");
        Ok(Self {
            registry,
            gateway_requests_total,
            chaos_injected_total,
            stub_calls_total,
            sagas_total,
            step_attempts_total,
            approvals_total,
            started_at: Instant::now(),
        })
    }

    pub fn inc_gateway_request(&self, route: &str, outcome: &str) {
        self.gateway_requests_total.with_label_values(&[route, outcome]).inc();
    }

    pub fn inc_chaos_injected(&self, code: u16) {
        let code = code.to_string();
        self.chaos_injected_total.with_label_values(&[code.as_str()]).inc();
    }

    pub fn inc_stub_call(&self, route: &str, result: &str) {
        self.stub_calls_total.with_label_values(&[route, result]).inc();
    }

    pub fn inc_saga(&self, outcome: &str) {
        self.sagas_total.with_label_values(&[outcome]).inc();
    }

    pub fn inc_step_attempt(&self, step: StepKind) {
        self.step_attempts_total.with_label_values(&[step.as_str()]).inc();
    }

    pub fn inc_approval(&self, ack: SignalAck) {
        self.approvals_total.with_label_values(&[ack.as_str()]).inc();
    }

    pub fn gateway_requests(&self, route: &str, outcome: &str) -> u64 {
        self.gateway_requests_total.with_label_values(&[route, outcome]).get()
    }

    pub fn stub_calls(&self, route: &str, result: &str) -> u64 {
        self.stub_calls_total.with_label_values(&[route, result]).get()
    }

    pub fn sagas(&self, outcome: &str) -> u64 {
        self.sagas_total.with_label_values(&[outcome]).get()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn encode(&self) -> Result<String, SagaError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(|err| SagaError::Message(err.to_string()))?;
        let output = String::from_utf8(buffer).map_err(|err| SagaError::Message(err.to_string()))?;
        Ok(output)
    }
}

/// Feeds saga lifecycle events into the prometheus counters.
pub struct MetricsObserver {
    metrics: Arc<Metrics>,
}

impl MetricsObserver {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl SagaObserver for MetricsObserver {
    fn on_saga_started(&self, _reference_id: &ReferenceId) {
        self.metrics.inc_saga("started");
    }

    fn on_step_attempt(&self, _reference_id: &ReferenceId, step: StepKind, _attempt: u32) {
        self.metrics.inc_step_attempt(step);
    }

    fn on_approval(&self, _reference_id: &ReferenceId, _approver: &ApproverId, ack: SignalAck) {
        self.metrics.inc_approval(ack);
    }

    fn on_completed(&self, _reference_id: &ReferenceId, _summary: &TransferSummary) {
        self.metrics.inc_saga("completed");
    }

    fn on_failed(&self, _reference_id: &ReferenceId, _failure: &SagaFailure) {
        self.metrics.inc_saga("failed");
    }
}
