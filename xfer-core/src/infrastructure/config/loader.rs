//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (`XFER_*` prefix)

use crate::foundation::{Result, SagaError};
use crate::infrastructure::config::types::{AppConfig, DEFAULT_API_ADDR, DEFAULT_GATEWAY_BIND_ADDR, DEFAULT_REMOTE_BASE_URL};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "xfer-config.toml";

/// Environment variable prefix for config overrides.
///
/// Example: `XFER_SAGA__RETRY__MAX_ATTEMPTS=5` -> `saga.retry.max_attempts`
const ENV_PREFIX: &str = "XFER_";

/// Load configuration from a specific file path. A missing file is not an error.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    info!("loading configuration path={}", path.display());
    let figment = figment_base(path).merge(Env::prefixed(ENV_PREFIX).split("__"));
    let mut config: AppConfig = figment.extract().map_err(|e| SagaError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config);
    debug!(
        "configuration loaded gateway_bind={} remote_base_url={} api_addr={} store_dir={:?}",
        config.gateway.bind_addr, config.saga.remote_base_url, config.saga.api_addr, config.saga.store_dir
    );
    Ok(config)
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn postprocess(config: &mut AppConfig) {
    if config.gateway.bind_addr.trim().is_empty() {
        config.gateway.bind_addr = DEFAULT_GATEWAY_BIND_ADDR.to_string();
    }
    if config.saga.api_addr.trim().is_empty() {
        config.saga.api_addr = DEFAULT_API_ADDR.to_string();
    }
    let base = config.saga.remote_base_url.trim().trim_end_matches('/');
    config.saga.remote_base_url = if base.is_empty() { DEFAULT_REMOTE_BASE_URL.to_string() } else { base.to_string() };
    if config.saga.store_dir.as_deref().is_some_and(|dir| dir.trim().is_empty()) {
        config.saga.store_dir = None;
    }
    if config.logging.log_dir.as_deref().is_some_and(|dir| dir.trim().is_empty()) {
        config.logging.log_dir = None;
    }
}
