//! Command-line flags layered over the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::JsonpdConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "jsonpd")]
#[command(version, about = "JSONP endpoint that defers content assembly to an ESI edge cache", long_about = None)]
pub struct Args {
    /// TOML config file; flags override its values
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bind address for the JSONP listener
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    pub bind: Option<String>,

    /// Runtime worker threads
    #[arg(short = 'n', long = "workers")]
    pub workers: Option<usize>,

    /// Query parameter carrying the callback name
    #[arg(long = "callback", visible_alias = "cb", value_name = "NAME")]
    pub callback: Option<String>,

    /// Request timeout in milliseconds
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Bind address for the stats listener
    #[arg(short = 'i', long = "info", value_name = "ADDR")]
    pub info: Option<String>,

    /// Do not start the stats listener
    #[arg(long)]
    pub no_stats: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics: Option<String>,
}

impl Args {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut JsonpdConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(workers) = self.workers {
            config.listener.workers = workers;
        }
        if let Some(callback) = &self.callback {
            config.jsonp.callback_param = callback.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.listener.timeout_ms = timeout_ms;
        }
        if let Some(info) = &self.info {
            config.stats.bind_address = info.clone();
        }
        if self.no_stats {
            config.stats.enabled = false;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.metrics {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }
    }

    /// Defaults, then the config file if any, then flags; validated.
    pub fn resolve(&self) -> Result<JsonpdConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => JsonpdConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
