use clap::Parser;
use std::path::PathBuf;
use xfer_core::infrastructure::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "xfer-service")]
#[command(about = "Transfer saga driver behind an HTTP API", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter; defaults to `logging.level`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override `saga.api_addr`
    #[arg(long)]
    pub api_addr: Option<String>,

    /// Override `saga.remote_base_url` (the chaos gateway)
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Override `saga.store_dir`
    #[arg(long)]
    pub store_dir: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(xfer_core::infrastructure::config::CONFIG_PATH_ENV, config_path);
        }
        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(xfer_core::infrastructure::config::DATA_DIR_ENV, data_dir);
        }
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(api_addr) = &self.api_addr {
            config.saga.api_addr = api_addr.clone();
        }
        if let Some(remote_url) = &self.remote_url {
            config.saga.remote_base_url = remote_url.trim_end_matches('/').to_string();
        }
        if let Some(store_dir) = &self.store_dir {
            config.saga.store_dir = Some(store_dir.clone());
        }
    }
}
