//! Fault-injection rules applied by the gateway in front of the remote stubs.

use crate::foundation::{DEFAULT_INJECTED_ERROR_CODES, ROUTE_AUTHORIZE_PAYMENT, ROUTE_DUMMY, ROUTE_SEND_CRYPTO, ROUTE_VERIFY_WALLET};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const FALLBACK_ERROR_CODE: u16 = 500;

fn default_error_codes() -> Vec<u16> {
    DEFAULT_INJECTED_ERROR_CODES.to_vec()
}

/// Delay and failure injection for a single route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteChaos {
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub error_rate: f64,
    #[serde(default = "default_error_codes")]
    pub error_codes: Vec<u16>,
}

impl Default for RouteChaos {
    fn default() -> Self {
        Self { delay_ms: 0, error_rate: 0.0, error_codes: default_error_codes() }
    }
}

impl RouteChaos {
    pub fn new(delay_ms: u64, error_rate: f64, error_codes: &[u16]) -> Self {
        Self { delay_ms, error_rate, error_codes: error_codes.to_vec() }
    }

    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Rolls the dice for one request. The delay is always applied, injected or not.
    pub fn decide<R: Rng + ?Sized>(&self, rng: &mut R) -> ChaosDecision {
        let inject = if self.error_rate > 0.0 && rng.gen::<f64>() < self.error_rate {
            Some(self.error_codes.choose(rng).copied().unwrap_or(FALLBACK_ERROR_CODE))
        } else {
            None
        };
        ChaosDecision { delay: self.delay(), inject }
    }

    fn validate(&self, label: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&self.error_rate) {
            errors.push(format!("chaos {label}: error_rate={} must be within [0, 1]", self.error_rate));
        }
        if self.error_rate > 0.0 && self.error_codes.is_empty() {
            errors.push(format!("chaos {label}: error_codes must not be empty when error_rate > 0"));
        }
        for code in &self.error_codes {
            if !(400..=599).contains(code) {
                errors.push(format!("chaos {label}: error code {code} is not a 4xx/5xx status"));
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaosDecision {
    pub delay: Duration,
    pub inject: Option<u16>,
}

/// Per-route chaos table. Routes without an entry use `default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    pub default: RouteChaos,
    pub routes: BTreeMap<String, RouteChaos>,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        let routes = BTreeMap::from([
            (ROUTE_DUMMY.to_string(), RouteChaos::new(500, 0.1, &[500])),
            (ROUTE_AUTHORIZE_PAYMENT.to_string(), RouteChaos::new(200, 0.05, &[500, 503])),
            (ROUTE_VERIFY_WALLET.to_string(), RouteChaos::new(100, 0.15, &[500])),
            (ROUTE_SEND_CRYPTO.to_string(), RouteChaos::new(1_000, 0.08, &[502, 504])),
        ]);
        Self { default: RouteChaos::default(), routes }
    }
}

impl ChaosConfig {
    /// No delay and no injected failures on any route.
    pub fn quiet() -> Self {
        Self { default: RouteChaos::quiet(), routes: BTreeMap::new() }
    }

    pub fn with_route(mut self, path: impl Into<String>, chaos: RouteChaos) -> Self {
        self.routes.insert(path.into(), chaos);
        self
    }

    pub fn resolve(&self, path: &str) -> &RouteChaos {
        self.routes.get(path).unwrap_or(&self.default)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        self.default.validate("default", &mut errors);
        for (path, chaos) in &self.routes {
            if !path.starts_with('/') {
                errors.push(format!("chaos route {path}: path must start with '/'"));
            }
            chaos.validate(path, &mut errors);
        }
        errors
    }
}
