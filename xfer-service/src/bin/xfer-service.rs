#[path = "xfer-service/cli.rs"]
mod cli;
#[path = "xfer-service/setup.rs"]
mod setup;

use crate::cli::Cli;
use log::info;
use std::net::SocketAddr;
use xfer_service::api::run_saga_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();
    let app_config = setup::load_app_config(|config| args.apply_overrides(config))?;
    setup::init_logging(&app_config, args.log_level.as_deref())?;
    let retry = &app_config.saga.retry;
    info!(
        "xfer-service starting api_addr={} remote_base_url={} max_attempts={} attempt_timeout_ms={} backoff_base_ms={} backoff_cap_ms={}",
        app_config.saga.api_addr,
        app_config.saga.remote_base_url,
        retry.max_attempts,
        retry.attempt_timeout_ms,
        retry.backoff_base_ms,
        retry.backoff_cap_ms
    );

    let state = setup::build_state(&app_config)?;
    let addr: SocketAddr = app_config.saga.api_addr.parse()?;
    run_saga_server(addr, state).await?;
    Ok(())
}
