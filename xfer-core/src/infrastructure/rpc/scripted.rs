//! In-process transport that replays scripted replies; used by tests and local dry runs.

use crate::domain::StepKind;
use crate::foundation::{Result, SagaError};
use crate::infrastructure::rpc::{RemoteResponse, StepTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum ScriptedReply {
    Respond(RemoteResponse),
    /// The call fails without an HTTP response.
    Error(String),
    /// The call never completes.
    Stall,
    /// Waits, then plays the inner reply.
    Delayed(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    pub fn status(status: u16, body: Value) -> Self {
        ScriptedReply::Respond(RemoteResponse::new(status, body))
    }

    pub fn rejected(detail: &str) -> Self {
        Self::status(400, json!({ "detail": detail }))
    }

    pub fn injected(status: u16) -> Self {
        Self::status(status, json!({ "detail": format!("Simulated {status} error"), "injected": true }))
    }
}

/// Replies queued per step. An empty queue answers like a healthy stub.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<StepKind, VecDeque<ScriptedReply>>>,
    calls: Mutex<Vec<(StepKind, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: StepKind, reply: ScriptedReply) {
        self.replies.lock().entry(step).or_default().push_back(reply);
    }

    pub fn with(self, step: StepKind, reply: ScriptedReply) -> Self {
        self.push(step, reply);
        self
    }

    pub fn calls(&self) -> Vec<(StepKind, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, step: StepKind) -> usize {
        self.calls.lock().iter().filter(|(called, _)| *called == step).count()
    }

    fn healthy_reply(&self, step: StepKind, body: &Value) -> RemoteResponse {
        let reference_id = body.get("reference_id").cloned().unwrap_or(Value::Null);
        let mut payload = json!({ "status": step.expected_status(), "reference_id": reference_id });
        if step == StepKind::Send {
            payload["transaction_id"] = json!(format!("txn_{:04}", self.call_count(StepKind::Send)));
        }
        RemoteResponse::new(200, payload)
    }
}

#[async_trait]
impl StepTransport for ScriptedTransport {
    async fn post(&self, step: StepKind, body: &Value) -> Result<RemoteResponse> {
        self.calls.lock().push((step, body.clone()));
        let next = self.replies.lock().get_mut(&step).and_then(VecDeque::pop_front);
        let mut reply = match next {
            Some(reply) => reply,
            None => return Ok(self.healthy_reply(step, body)),
        };
        loop {
            match reply {
                ScriptedReply::Respond(response) => return Ok(response),
                ScriptedReply::Error(details) => return Err(SagaError::transport(format!("post {}", step.route()), details)),
                ScriptedReply::Stall => return std::future::pending().await,
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
