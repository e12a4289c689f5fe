//! Seedable chaos decisions for the fault injection gateway.

use log::{debug, info};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use xfer_core::domain::{ChaosConfig, ChaosDecision};

/// Owns the route table and the random source behind every injection decision.
///
/// With a fixed seed the sequence of decisions is reproducible, which the gateway tests rely on.
pub struct ChaosEngine {
    config: ChaosConfig,
    rng: Mutex<ChaCha20Rng>,
}

impl ChaosEngine {
    pub fn new(config: ChaosConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => {
                info!("chaos engine seeded seed={}", seed);
                ChaCha20Rng::seed_from_u64(seed)
            }
            None => ChaCha20Rng::from_entropy(),
        };
        Self { config, rng: Mutex::new(rng) }
    }

    pub fn decide(&self, path: &str) -> ChaosDecision {
        let route = self.config.resolve(path);
        let decision = route.decide(&mut *self.rng.lock());
        debug!("chaos decision path={} delay_ms={} inject={:?}", path, decision.delay.as_millis(), decision.inject);
        decision
    }
}
