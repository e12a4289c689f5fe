use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock timestamp in nanoseconds.
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_secs().saturating_mul(1_000_000_000).saturating_add(u64::from(now.subsec_nanos())))
        .unwrap_or(0)
}
