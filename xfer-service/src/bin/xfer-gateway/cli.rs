use clap::Parser;
use std::path::PathBuf;
use xfer_core::infrastructure::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "xfer-gateway")]
#[command(about = "Remote service stubs behind a chaos gateway", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter (e.g. `info`, `debug,xfer_core=trace`); defaults to `logging.level`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override `gateway.bind_addr`
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Fixed RNG seed for reproducible chaos and stub decisions
    #[arg(long)]
    pub seed: Option<u64>,
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
        if let Some(bind) = &self.bind {
            config.gateway.bind_addr = bind.clone();
        }
        if self.seed.is_some() {
            config.gateway.seed = self.seed;
        }
    }
}
