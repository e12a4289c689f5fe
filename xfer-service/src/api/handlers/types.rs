use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use xfer_core::domain::{Amount, SagaFailure, SagaPhase, SagaState, SignalAck};
use xfer_core::foundation::{util::time::now_nanos, ApproverId, ErrorCode, ReferenceId, SagaError, TransactionId};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub detail: String,
}

pub fn error_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MalformedRequest | ErrorCode::InvalidAmount => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DuplicateSaga => StatusCode::CONFLICT,
        ErrorCode::UnknownSaga => StatusCode::NOT_FOUND,
        ErrorCode::SagaAborted => StatusCode::GONE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &SagaError) -> Response {
    let context = err.context();
    let status = error_status(context.code);
    if status.is_server_error() {
        error!("saga api error code={:?} error={}", context.code, context.message);
    } else {
        warn!("saga api request refused code={:?} error={}", context.code, context.message);
    }
    (status, Json(ErrorBody { code: format!("{:?}", context.code), detail: context.message })).into_response()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub reference_id: ReferenceId,
    /// `started` or `existing`.
    pub disposition: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub approver: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveResponse {
    pub reference_id: ReferenceId,
    pub ack: SignalAck,
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub wait_ms: Option<u64>,
}

/// Public view of a saga. The card number is masked.
#[derive(Debug, Serialize, Deserialize)]
pub struct SagaStatusView {
    pub reference_id: ReferenceId,
    pub phase: SagaPhase,
    pub approved: bool,
    pub approver: Option<ApproverId>,
    pub source_wallet_id: String,
    pub destination_wallet_id: String,
    pub card_number: String,
    pub amount: Amount,
    pub verification_status: Option<String>,
    pub authorization_status: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub failure: Option<SagaFailure>,
    pub phase_elapsed_ms: u64,
}

impl From<&SagaState> for SagaStatusView {
    fn from(state: &SagaState) -> Self {
        Self {
            reference_id: state.reference_id().clone(),
            phase: state.phase,
            approved: state.approved,
            approver: state.approver.clone(),
            source_wallet_id: state.request.source_wallet_id().to_string(),
            destination_wallet_id: state.request.destination_wallet_id().to_string(),
            card_number: state.request.masked_card(),
            amount: state.request.amount(),
            verification_status: state.verification_status.clone(),
            authorization_status: state.authorization_status.clone(),
            transaction_id: state.transaction_id.clone(),
            failure: state.failure.clone(),
            phase_elapsed_ms: state.phase_elapsed_ms(now_nanos()),
        }
    }
}
