#[path = "xfer-gateway/cli.rs"]
mod cli;
#[path = "xfer-gateway/setup.rs"]
mod setup;

use crate::cli::Cli;
use log::info;
use std::net::SocketAddr;
use xfer_service::api::run_gateway_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();
    let app_config = setup::load_app_config(|config| args.apply_overrides(config))?;
    setup::init_logging(&app_config, args.log_level.as_deref())?;
    info!(
        "xfer-gateway starting bind_addr={} stub_mode={:?} rejection_rate={} seeded={}",
        app_config.gateway.bind_addr,
        app_config.stubs.mode,
        app_config.stubs.rejection_rate,
        app_config.gateway.seed.is_some()
    );

    let state = setup::build_state(&app_config)?;
    let addr: SocketAddr = app_config.gateway.bind_addr.parse()?;
    run_gateway_server(addr, state).await?;
    Ok(())
}
