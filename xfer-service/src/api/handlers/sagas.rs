use super::types::{error_response, ApproveRequest, ApproveResponse, ErrorBody, ResultQuery, SagaStatusView, StartResponse};
use crate::api::state::SagaApiState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use xfer_core::application::StartDisposition;
use xfer_core::domain::{SignalAck, TransferRequest};
use xfer_core::foundation::{ErrorCode, ReferenceId, SagaError};

fn malformed(detail: impl Into<String>) -> Response {
    let body = ErrorBody { code: format!("{:?}", ErrorCode::MalformedRequest), detail: detail.into() };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

pub async fn start_saga(State(state): State<Arc<SagaApiState>>, payload: Result<Json<TransferRequest>, JsonRejection>) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("start saga refused malformed body detail={}", rejection.body_text());
            return malformed(rejection.body_text());
        }
    };
    info!(
        "start saga requested reference_id={} amount={} card={}",
        request.reference_id(),
        request.amount(),
        request.masked_card()
    );
    match state.driver.start(request) {
        Ok((handle, disposition)) => {
            let (status, label) = match disposition {
                StartDisposition::Started => (StatusCode::ACCEPTED, "started"),
                StartDisposition::Existing => (StatusCode::OK, "existing"),
            };
            (status, Json(StartResponse { reference_id: handle.reference_id().clone(), disposition: label.to_string() })).into_response()
        }
        Err(err) => error_response(&err),
    }
}

pub async fn approve_saga(
    State(state): State<Arc<SagaApiState>>,
    Path(reference_id): Path<String>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let approver = match payload {
        Ok(Json(body)) if !body.approver.trim().is_empty() => body.approver,
        Ok(_) => return malformed("approver must not be empty"),
        Err(rejection) => return malformed(rejection.body_text()),
    };
    let reference_id = ReferenceId::from(reference_id);
    match state.driver.signal_approval(&reference_id, approver) {
        Ok(ack) => {
            let status = if ack == SignalAck::UnknownInstance { StatusCode::NOT_FOUND } else { StatusCode::OK };
            (status, Json(ApproveResponse { reference_id, ack })).into_response()
        }
        Err(err) => error_response(&err),
    }
}

pub async fn get_saga(State(state): State<Arc<SagaApiState>>, Path(reference_id): Path<String>) -> Response {
    let reference_id = ReferenceId::from(reference_id);
    match state.driver.status(&reference_id) {
        Ok(Some(saga)) => Json(SagaStatusView::from(&saga)).into_response(),
        Ok(None) => error_response(&SagaError::UnknownSaga(reference_id.to_string())),
        Err(err) => error_response(&err),
    }
}

/// Long-poll for the terminal outcome. Answers 202 with the current phase while the saga is still running.
pub async fn get_saga_result(
    State(state): State<Arc<SagaApiState>>,
    Path(reference_id): Path<String>,
    Query(query): Query<ResultQuery>,
) -> Response {
    let reference_id = ReferenceId::from(reference_id);
    let wait = Duration::from_millis(query.wait_ms.unwrap_or(0)).min(state.result_wait);
    match state.driver.await_result_timeout(&reference_id, wait).await {
        Ok(Some(outcome)) => Json(outcome).into_response(),
        Ok(None) => {
            let phase = state.driver.status(&reference_id).ok().flatten().map(|saga| saga.phase);
            debug!("saga result pending reference_id={} waited_ms={} phase={:?}", reference_id, wait.as_millis(), phase);
            (StatusCode::ACCEPTED, Json(serde_json::json!({ "reference_id": reference_id, "result": "pending", "phase": phase })))
                .into_response()
        }
        Err(err) => error_response(&err),
    }
}
