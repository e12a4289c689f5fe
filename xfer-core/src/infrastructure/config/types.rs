use crate::domain::{ChaosConfig, RetryPolicy};
use crate::foundation::DEFAULT_DOMAIN_REJECTION_RATE;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GATEWAY_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_REMOTE_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_ADDR: &str = "127.0.0.1:8088";
pub const DEFAULT_RESULT_WAIT_MS: u64 = 30_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub chaos: ChaosConfig,
    pub stubs: StubConfig,
    pub saga: SagaConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: String,
    /// Fixed RNG seed for chaos and stub decisions; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_GATEWAY_BIND_ADDR.to_string(), seed: None }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubMode {
    /// Reject a `rejection_rate` share of valid requests.
    #[default]
    Random,
    AlwaysSucceed,
    AlwaysReject,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    pub mode: StubMode,
    pub rejection_rate: f64,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self { mode: StubMode::Random, rejection_rate: DEFAULT_DOMAIN_REJECTION_RATE }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SagaConfig {
    /// Base URL of the chaos gateway fronting the remote stubs.
    pub remote_base_url: String,
    pub api_addr: String,
    /// Directory for durable saga state; in-memory when unset.
    pub store_dir: Option<String>,
    /// Upper bound on how long `GET /sagas/{id}/result` may block.
    pub result_wait_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            api_addr: DEFAULT_API_ADDR.to_string(),
            store_dir: None,
            result_wait_ms: DEFAULT_RESULT_WAIT_MS,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter expression, e.g. `info` or `info,xfer_core=debug,reqwest=warn`.
    pub level: String,
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), log_dir: None }
    }
}
