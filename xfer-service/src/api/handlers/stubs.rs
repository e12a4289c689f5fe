use crate::api::state::GatewayState;
use crate::service::stubs::{
    StubRoute, AUTHORIZE_REJECTION_DETAIL, DUMMY_MESSAGE, SEND_REJECTION_DETAIL, VERIFY_REJECTION_DETAIL,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use xfer_core::foundation::{STATUS_AUTHORIZED, STATUS_SENT, STATUS_VERIFIED};

#[derive(Debug, Deserialize)]
pub struct AuthorizePaymentRequest {
    pub card_number: String,
    pub reference_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyWalletRequest {
    pub wallet_id: String,
    pub reference_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendCryptoRequest {
    pub source_wallet_id: String,
    pub dest_wallet_id: String,
    pub reference_id: String,
}

trait StubRequest {
    fn fields(&self) -> Vec<(&'static str, &str)>;
}

impl StubRequest for AuthorizePaymentRequest {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![("card_number", self.card_number.as_str()), ("reference_id", self.reference_id.as_str())]
    }
}

impl StubRequest for VerifyWalletRequest {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![("wallet_id", self.wallet_id.as_str()), ("reference_id", self.reference_id.as_str())]
    }
}

impl StubRequest for SendCryptoRequest {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("source_wallet_id", self.source_wallet_id.as_str()),
            ("dest_wallet_id", self.dest_wallet_id.as_str()),
            ("reference_id", self.reference_id.as_str()),
        ]
    }
}

/// Counts the call and checks the body's shape. Malformed input is a caller bug, answered with a fixed 422.
fn accept<T: StubRequest>(state: &GatewayState, route: StubRoute, payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    state.stubs.record_call(route);
    let problem = match &payload {
        Err(rejection) => Some(rejection.body_text()),
        Ok(Json(request)) => request.fields().into_iter().find(|(_, value)| value.trim().is_empty()).map(|(name, _)| format!("{} must not be empty", name)),
    };
    match (payload, problem) {
        (Ok(Json(request)), None) => Ok(request),
        (_, problem) => {
            let detail = format!("malformed request: {}", problem.unwrap_or_default());
            debug!("stub refused malformed request route={} detail={}", route.path(), detail);
            state.metrics.inc_stub_call(route.path(), "malformed");
            Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": detail }))).into_response())
        }
    }
}

fn reject(state: &GatewayState, route: StubRoute, reference_id: &str, detail: &str) -> Response {
    info!("stub rejected request route={} reference_id={} detail={}", route.path(), reference_id, detail);
    state.metrics.inc_stub_call(route.path(), "rejected");
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

fn succeed(state: &GatewayState, route: StubRoute, body: Value) -> Response {
    debug!("stub succeeded route={} body={}", route.path(), body);
    state.metrics.inc_stub_call(route.path(), "ok");
    Json(body).into_response()
}

pub async fn handle_dummy(State(state): State<Arc<GatewayState>>) -> Response {
    state.stubs.record_call(StubRoute::Dummy);
    succeed(&state, StubRoute::Dummy, json!({ "message": DUMMY_MESSAGE }))
}

pub async fn handle_authorize_payment(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<AuthorizePaymentRequest>, JsonRejection>,
) -> Response {
    let route = StubRoute::Authorize;
    let request = match accept(&state, route, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if state.stubs.should_reject() {
        return reject(&state, route, &request.reference_id, AUTHORIZE_REJECTION_DETAIL);
    }
    succeed(&state, route, json!({ "status": STATUS_AUTHORIZED, "reference_id": request.reference_id }))
}

pub async fn handle_verify_wallet(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<VerifyWalletRequest>, JsonRejection>,
) -> Response {
    let route = StubRoute::Verify;
    let request = match accept(&state, route, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if state.stubs.should_reject() {
        return reject(&state, route, &request.reference_id, VERIFY_REJECTION_DETAIL);
    }
    succeed(&state, route, json!({ "status": STATUS_VERIFIED, "reference_id": request.reference_id }))
}

pub async fn handle_send_crypto(State(state): State<Arc<GatewayState>>, payload: Result<Json<SendCryptoRequest>, JsonRejection>) -> Response {
    let route = StubRoute::Send;
    let request = match accept(&state, route, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if state.stubs.should_reject() {
        return reject(&state, route, &request.reference_id, SEND_REJECTION_DETAIL);
    }
    let transaction_id = state.stubs.new_transaction_id();
    info!(
        "stub sent crypto reference_id={} source_wallet_id={} dest_wallet_id={} transaction_id={}",
        request.reference_id, request.source_wallet_id, request.dest_wallet_id, transaction_id
    );
    succeed(
        &state,
        route,
        json!({ "status": STATUS_SENT, "transaction_id": transaction_id, "reference_id": request.reference_id }),
    )
}
