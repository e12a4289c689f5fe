use crate::foundation::{DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_CAP_MS, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds for invoking one saga step against an unreliable remote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per step including the first; values below 1 behave as 1.
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_cap_ms: DEFAULT_BACKOFF_CAP_MS,
        }
    }
}

impl RetryPolicy {
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Pause before attempt `attempt` (1-based): `min(base * attempt, cap)`, none before the first.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let delay = self.backoff_base_ms.saturating_mul(u64::from(attempt)).min(self.backoff_cap_ms);
        Duration::from_millis(delay)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_attempts == 0 {
            errors.push("retry.max_attempts must be >= 1".to_string());
        }
        if self.attempt_timeout_ms == 0 {
            errors.push("retry.attempt_timeout_ms must be > 0".to_string());
        }
        if self.backoff_cap_ms < self.backoff_base_ms {
            errors.push(format!(
                "retry.backoff_cap_ms={} must be >= retry.backoff_base_ms={}",
                self.backoff_cap_ms, self.backoff_base_ms
            ));
        }
        errors
    }
}
