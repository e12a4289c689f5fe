use crate::domain::StepKind;
use crate::foundation::{Result, SagaError};
use crate::infrastructure::rpc::{RemoteResponse, StepTransport};
use async_trait::async_trait;
use log::trace;
use serde_json::Value;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Reaches the remote stubs through the chaos gateway over HTTP.
pub struct HttpStepTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStepTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| SagaError::transport("build http client", err))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StepTransport for HttpStepTransport {
    async fn post(&self, step: StepKind, body: &Value) -> Result<RemoteResponse> {
        let url = format!("{}{}", self.base_url, step.route());
        trace!("remote call step={} url={}", step, url);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok(RemoteResponse::new(status, decode_body(&bytes)))
    }
}

/// Non-JSON bodies are kept as a string so the classifier can still quote them.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
