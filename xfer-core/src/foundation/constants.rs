//! System-wide constants for the transfer saga.

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Maximum attempts per step, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Hard deadline for a single remote call attempt (5 seconds).
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 5_000;

/// Backoff grows linearly from this base with the attempt number.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Upper bound for any single backoff interval (2 seconds).
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 2_000;

/// Share of otherwise-valid stub requests refused with a domain rejection.
pub const DEFAULT_DOMAIN_REJECTION_RATE: f64 = 0.2;

/// Status codes the gateway may inject when a route has no explicit list.
pub const DEFAULT_INJECTED_ERROR_CODES: &[u16] = &[500, 502, 503, 504];

/// Remote route paths.
pub const ROUTE_AUTHORIZE_PAYMENT: &str = "/authorize_payment";
pub const ROUTE_VERIFY_WALLET: &str = "/verify_wallet";
pub const ROUTE_SEND_CRYPTO: &str = "/send_crypto";
pub const ROUTE_DUMMY: &str = "/dummy";

/// Business status values returned by successful stubs.
pub const STATUS_AUTHORIZED: &str = "authorized";
pub const STATUS_VERIFIED: &str = "verified";
pub const STATUS_SENT: &str = "sent";

/// Body field marking a gateway-manufactured failure.
pub const INJECTED_MARKER_FIELD: &str = "injected";

/// Header set on every gateway-injected response.
pub const INJECTED_HEADER: &str = "x-chaos-injected";

/// Maximum length of a reference id.
pub const MAX_REFERENCE_ID_LENGTH: usize = 128;

/// Card numbers are accepted when their digit count is within this range.
pub const MIN_CARD_DIGITS: usize = 12;
pub const MAX_CARD_DIGITS: usize = 19;

/// Fractional digits carried by `Amount`.
pub const AMOUNT_DECIMALS: u32 = 8;

/// Base units per whole amount (10^8).
pub const AMOUNT_SCALE: u64 = 100_000_000;
