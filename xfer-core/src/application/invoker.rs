use crate::application::lifecycle::SagaObserver;
use crate::domain::{classify_response, RetryPolicy, StepKind, StepOutcome, TransferRequest};
use crate::foundation::ReferenceId;
use crate::infrastructure::rpc::StepTransport;
use log::debug;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{sleep, timeout};

/// Runs one saga step against the remote side with bounded, transport-only retries.
pub struct StepInvoker {
    transport: Arc<dyn StepTransport>,
    observer: Arc<dyn SagaObserver>,
}

impl StepInvoker {
    pub fn new(transport: Arc<dyn StepTransport>, observer: Arc<dyn SagaObserver>) -> Self {
        Self { transport, observer }
    }

    /// Invokes `step` until it succeeds, fails for a non-transport reason, or runs out of attempts.
    ///
    /// Never returns an error: every failure mode is folded into the returned `StepOutcome`.
    pub async fn invoke(&self, step: StepKind, request: &TransferRequest, policy: &RetryPolicy) -> StepOutcome {
        let reference_id = request.reference_id();
        let body = step.request_body(request);
        let max_attempts = policy.effective_max_attempts();
        let mut attempt = 1;
        loop {
            let backoff = policy.backoff_before(attempt);
            if !backoff.is_zero() {
                sleep(backoff).await;
            }
            self.observer.on_step_attempt(reference_id, step, attempt);

            let outcome = self.attempt(step, reference_id, &body, attempt, policy).await;
            if !outcome.is_retryable() || attempt >= max_attempts {
                return outcome;
            }
            debug!(
                "retrying step reference_id={} step={} attempt={} max_attempts={} reason={}",
                reference_id,
                step,
                attempt,
                max_attempts,
                outcome.reason().unwrap_or_default()
            );
            attempt += 1;
        }
    }

    async fn attempt(&self, step: StepKind, reference_id: &ReferenceId, body: &Value, attempt: u32, policy: &RetryPolicy) -> StepOutcome {
        match timeout(policy.attempt_timeout(), self.transport.post(step, body)).await {
            Err(_) => StepOutcome::transport(format!("no response within {}ms", policy.attempt_timeout_ms), attempt),
            Ok(Err(err)) => StepOutcome::transport(err.to_string(), attempt),
            Ok(Ok(response)) => classify_response(step, reference_id, response.status, &response.body, attempt),
        }
    }
}
