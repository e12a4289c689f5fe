use log::{info, warn};
use std::sync::Arc;
use xfer_core::foundation::SagaError;
use xfer_core::infrastructure::config::{load_config_from_file, resolve_config_path, resolve_data_dir, AppConfig};
use xfer_service::api::GatewayState;
use xfer_service::service::chaos::ChaosEngine;
use xfer_service::service::metrics::Metrics;
use xfer_service::service::stubs::StubBackend;

/// Loads the layered config, applies CLI overrides, then validates the result.
pub fn load_app_config(overrides: impl FnOnce(&mut AppConfig)) -> Result<AppConfig, SagaError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir);
    let mut app_config = load_config_from_file(&config_path)?;
    overrides(&mut app_config);
    if let Err(errors) = app_config.validate() {
        for err in &errors {
            warn!("config validation error: {}", err);
        }
        return Err(SagaError::ConfigError(format!("validation failed: {}", errors.join("; "))));
    }
    Ok(app_config)
}

pub fn init_logging(app_config: &AppConfig, cli_level: Option<&str>) -> Result<(), SagaError> {
    let filters = cli_level.unwrap_or(&app_config.logging.level);
    xfer_core::infrastructure::logging::init_logger(app_config.logging.log_dir.as_deref(), filters)
}

pub fn build_state(app_config: &AppConfig) -> Result<Arc<GatewayState>, SagaError> {
    let seed = app_config.gateway.seed;
    let state = GatewayState {
        chaos: Arc::new(ChaosEngine::new(app_config.chaos.clone(), seed)),
        stubs: Arc::new(StubBackend::new(&app_config.stubs, seed.map(|seed| seed.wrapping_add(1)))),
        metrics: Arc::new(Metrics::new()?),
    };
    for (route, chaos) in &app_config.chaos.routes {
        info!(
            "chaos route configured route={} delay_ms={} error_rate={} error_codes={:?}",
            route, chaos.delay_ms, chaos.error_rate, chaos.error_codes
        );
    }
    Ok(Arc::new(state))
}
