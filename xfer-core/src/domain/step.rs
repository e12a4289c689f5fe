use crate::domain::transfer::TransferRequest;
use crate::foundation::{ReferenceId, TransactionId};
use crate::foundation::{
    INJECTED_MARKER_FIELD, ROUTE_AUTHORIZE_PAYMENT, ROUTE_SEND_CRYPTO, ROUTE_VERIFY_WALLET, STATUS_AUTHORIZED, STATUS_SENT,
    STATUS_VERIFIED,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

const MAX_REASON_CHARS: usize = 256;

/// One remote call of the transfer saga.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Verify,
    Authorize,
    Send,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [StepKind::Verify, StepKind::Authorize, StepKind::Send];

    pub fn route(self) -> &'static str {
        match self {
            StepKind::Verify => ROUTE_VERIFY_WALLET,
            StepKind::Authorize => ROUTE_AUTHORIZE_PAYMENT,
            StepKind::Send => ROUTE_SEND_CRYPTO,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Verify => "verify",
            StepKind::Authorize => "authorize",
            StepKind::Send => "send",
        }
    }

    pub fn expected_status(self) -> &'static str {
        match self {
            StepKind::Verify => STATUS_VERIFIED,
            StepKind::Authorize => STATUS_AUTHORIZED,
            StepKind::Send => STATUS_SENT,
        }
    }

    /// Builds the JSON body the remote stub expects for this step.
    ///
    /// Wallet verification targets the destination wallet: funds must have somewhere to land.
    pub fn request_body(self, request: &TransferRequest) -> Value {
        match self {
            StepKind::Verify => json!({
                "wallet_id": request.destination_wallet_id(),
                "reference_id": request.reference_id(),
            }),
            StepKind::Authorize => json!({
                "card_number": request.card_number(),
                "reference_id": request.reference_id(),
            }),
            StepKind::Send => json!({
                "source_wallet_id": request.source_wallet_id(),
                "dest_wallet_id": request.destination_wallet_id(),
                "reference_id": request.reference_id(),
            }),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body returned by a remote stub on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPayload {
    pub status: String,
    pub reference_id: ReferenceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DomainRejection,
    MalformedRequest,
    TransportFailure,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::TransportFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::DomainRejection => "domain_rejection",
            FailureKind::MalformedRequest => "malformed_request",
            FailureKind::TransportFailure => "transport_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of invoking one step, after retries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Success(StepPayload),
    DomainRejection { reason: String },
    MalformedRequest { reason: String },
    TransportFailure { reason: String, attempts: u32 },
}

impl StepOutcome {
    pub fn transport(reason: impl Into<String>, attempts: u32) -> Self {
        StepOutcome::TransportFailure { reason: reason.into(), attempts }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            StepOutcome::Success(_) => None,
            StepOutcome::DomainRejection { .. } => Some(FailureKind::DomainRejection),
            StepOutcome::MalformedRequest { .. } => Some(FailureKind::MalformedRequest),
            StepOutcome::TransportFailure { .. } => Some(FailureKind::TransportFailure),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.failure_kind().is_some_and(FailureKind::is_retryable)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Success(_) => None,
            StepOutcome::DomainRejection { reason }
            | StepOutcome::MalformedRequest { reason }
            | StepOutcome::TransportFailure { reason, .. } => Some(reason),
        }
    }
}

/// Maps one HTTP response from the remote side into a step outcome.
///
/// | response                                   | outcome           |
/// |--------------------------------------------|-------------------|
/// | body carries `"injected": true`            | TransportFailure  |
/// | 400                                        | DomainRejection   |
/// | 408, 429, 5xx                              | TransportFailure  |
/// | other 4xx                                  | MalformedRequest  |
/// | 2xx, unexpected status or missing fields   | DomainRejection   |
/// | 2xx, expected status                       | Success           |
pub fn classify_response(step: StepKind, expected_reference: &ReferenceId, status: u16, body: &Value, attempt: u32) -> StepOutcome {
    if is_injected(body) {
        return StepOutcome::transport(format!("injected fault status={} detail={}", status, detail_of(body)), attempt);
    }

    match status {
        200..=299 => classify_success(step, expected_reference, body),
        400 => StepOutcome::DomainRejection { reason: detail_of(body) },
        408 | 429 | 500..=599 => StepOutcome::transport(format!("status={} detail={}", status, detail_of(body)), attempt),
        401..=499 => StepOutcome::MalformedRequest { reason: format!("status={} detail={}", status, detail_of(body)) },
        _ => StepOutcome::transport(format!("unexpected status={}", status), attempt),
    }
}

fn classify_success(step: StepKind, expected_reference: &ReferenceId, body: &Value) -> StepOutcome {
    let payload: StepPayload = match serde_json::from_value(body.clone()) {
        Ok(payload) => payload,
        Err(err) => return StepOutcome::DomainRejection { reason: format!("unreadable {} response: {}", step, err) },
    };
    if payload.status != step.expected_status() {
        return StepOutcome::DomainRejection {
            reason: format!("{} returned status={} expected={}", step, payload.status, step.expected_status()),
        };
    }
    if &payload.reference_id != expected_reference {
        return StepOutcome::DomainRejection {
            reason: format!("{} echoed reference_id={} expected={}", step, payload.reference_id, expected_reference),
        };
    }
    if step == StepKind::Send && payload.transaction_id.as_ref().map_or(true, |id| id.is_blank()) {
        return StepOutcome::DomainRejection { reason: "send succeeded without a transaction_id".to_string() };
    }
    StepOutcome::Success(payload)
}

fn is_injected(body: &Value) -> bool {
    body.get(INJECTED_MARKER_FIELD).and_then(Value::as_bool).unwrap_or(false)
}

fn detail_of(body: &Value) -> String {
    let detail = match body.get("detail") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None if body.is_null() => "<empty body>".to_string(),
        None => body.to_string(),
    };
    detail.chars().take(MAX_REASON_CHARS).collect()
}
