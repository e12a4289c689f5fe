use crate::domain::StepKind;
use crate::foundation::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod scripted;

pub use http::HttpStepTransport;
pub use scripted::{ScriptedReply, ScriptedTransport};

/// Raw HTTP-level answer from the remote side, before classification.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Value,
}

impl RemoteResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// One POST to the remote route backing `step`. `Err` means no HTTP response arrived at all.
#[async_trait]
pub trait StepTransport: Send + Sync {
    async fn post(&self, step: StepKind, body: &Value) -> Result<RemoteResponse>;
}
