use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use xfer_core::application::{CompositeObserver, SagaDriver};
use xfer_core::foundation::SagaError;
use xfer_core::infrastructure::config::{load_config_from_file, resolve_config_path, resolve_data_dir, AppConfig};
use xfer_core::infrastructure::rpc::HttpStepTransport;
use xfer_core::infrastructure::storage::{FileSagaStore, MemorySagaStore, SagaStore};
use xfer_service::api::SagaApiState;
use xfer_service::service::metrics::{Metrics, MetricsObserver};

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

pub fn init_store(app_config: &AppConfig) -> Result<Arc<dyn SagaStore>, SagaError> {
    match app_config.saga.store_dir.as_deref() {
        Some(dir) => {
            info!("using file saga store dir={}", dir);
            Ok(Arc::new(FileSagaStore::open(dir)?))
        }
        None => {
            warn!("saga.store_dir not set; saga state is kept in memory and lost on restart");
            Ok(Arc::new(MemorySagaStore::default()))
        }
    }
}

/// Builds the driver and resumes every saga left active in the store.
pub fn build_state(app_config: &AppConfig) -> Result<Arc<SagaApiState>, SagaError> {
    let metrics = Arc::new(Metrics::new()?);
    let store = init_store(app_config)?;
    let transport = Arc::new(HttpStepTransport::new(app_config.saga.remote_base_url.clone())?);

    let mut observer = CompositeObserver::new();
    observer.add_observer(Arc::new(MetricsObserver::new(metrics.clone())));

    let driver = Arc::new(SagaDriver::new(store, transport, app_config.saga.retry.clone(), Arc::new(observer)));
    let resumed = driver.recover()?;
    info!("saga recovery finished resumed={}", resumed);

    Ok(Arc::new(SagaApiState { driver, metrics, result_wait: Duration::from_millis(app_config.saga.result_wait_ms) }))
}
