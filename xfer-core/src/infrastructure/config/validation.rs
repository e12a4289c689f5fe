use crate::infrastructure::config::types::AppConfig;
use std::net::SocketAddr;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.gateway.bind_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("invalid gateway.bind_addr: {}", self.gateway.bind_addr));
        }
        errors.extend(self.chaos.validate());

        if !(0.0..=1.0).contains(&self.stubs.rejection_rate) {
            errors.push(format!("stubs.rejection_rate={} must be within [0, 1]", self.stubs.rejection_rate));
        }

        let base = self.saga.remote_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push(format!("saga.remote_base_url must be an http(s) URL: {}", self.saga.remote_base_url));
        }
        if self.saga.api_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("invalid saga.api_addr: {}", self.saga.api_addr));
        }
        if self.saga.result_wait_ms == 0 {
            errors.push("saga.result_wait_ms must be > 0".to_string());
        }
        errors.extend(self.saga.retry.validate().into_iter().map(|err| format!("saga.{err}")));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
