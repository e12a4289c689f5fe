mod handlers;
mod middleware;
mod router;
mod state;

pub use handlers::types::{ApproveRequest, ApproveResponse, ErrorBody, SagaStatusView, StartResponse};
pub use middleware::correlation::CorrelationId;
pub use router::{build_gateway_router, build_saga_router, run_gateway_server, run_saga_server, serve_router};
pub use state::{GatewayState, SagaApiState};
