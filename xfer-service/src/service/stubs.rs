//! Behavior of the remote service stubs sitting behind the gateway.

use log::info;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use xfer_core::foundation::{ROUTE_AUTHORIZE_PAYMENT, ROUTE_DUMMY, ROUTE_SEND_CRYPTO, ROUTE_VERIFY_WALLET};
use xfer_core::infrastructure::config::{StubConfig, StubMode};

pub const AUTHORIZE_REJECTION_DETAIL: &str = "Simulated Bad Request";
pub const VERIFY_REJECTION_DETAIL: &str = "Simulated Bad Request for Wallet Verification";
pub const SEND_REJECTION_DETAIL: &str = "Simulated Bad Request for Crypto Send";
pub const DUMMY_MESSAGE: &str = "This is a dummy response.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubRoute {
    Dummy,
    Authorize,
    Verify,
    Send,
}

impl StubRoute {
    pub fn path(self) -> &'static str {
        match self {
            StubRoute::Dummy => ROUTE_DUMMY,
            StubRoute::Authorize => ROUTE_AUTHORIZE_PAYMENT,
            StubRoute::Verify => ROUTE_VERIFY_WALLET,
            StubRoute::Send => ROUTE_SEND_CRYPTO,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub struct StubBackend {
    mode: StubMode,
    rejection_rate: f64,
    rng: Mutex<ChaCha20Rng>,
    calls: [AtomicU64; 4],
}

impl StubBackend {
    pub fn new(config: &StubConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        info!("stub backend ready mode={:?} rejection_rate={}", config.mode, config.rejection_rate);
        Self {
            mode: config.mode,
            rejection_rate: config.rejection_rate,
            rng: Mutex::new(rng),
            calls: Default::default(),
        }
    }

    pub fn mode(&self) -> StubMode {
        self.mode
    }

    /// Counts a request that reached the stub, malformed or not.
    pub fn record_call(&self, route: StubRoute) -> u64 {
        self.calls[route.index()].fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn call_count(&self, route: StubRoute) -> u64 {
        self.calls[route.index()].load(Ordering::Relaxed)
    }

    /// Independent draw per call; nothing is correlated across retries or stubs.
    pub fn should_reject(&self) -> bool {
        match self.mode {
            StubMode::AlwaysSucceed => false,
            StubMode::AlwaysReject => true,
            StubMode::Random => self.rejection_rate > 0.0 && self.rng.lock().gen::<f64>() < self.rejection_rate,
        }
    }

    pub fn new_transaction_id(&self) -> String {
        format!("txn_{}", self.rng.lock().gen_range(1000..=9999))
    }
}
