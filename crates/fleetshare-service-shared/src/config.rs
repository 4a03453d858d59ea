//! Service configuration read from the environment at startup.
//!
//! | Variable               | Default          |
//! |------------------------|------------------|
//! | `FLEETSHARE_DATA_PATH` | `/data/fleet.db` |
//! | `SERVICE_PORT`         | `8080`           |
//! | `FLEETSHARE_API_KEY`   | unset (no auth)  |
//!
//! Logging and metrics variables are documented on [`LoggingConfig`] and
//! [`MetricsConfig`].

use std::path::PathBuf;

use crate::logging::LoggingConfig;
use crate::metrics::MetricsConfig;

pub const DEFAULT_DATA_PATH: &str = "/data/fleet.db";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub api_key: Option<String>,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            api_key: None,
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
            .with_logging(LoggingConfig::from_env())
            .with_metrics(MetricsConfig::from_env())
    }

    /// Build from an arbitrary variable source. Unparseable ports fall back
    /// to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_path = lookup("FLEETSHARE_DATA_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let port = lookup("SERVICE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);
        let api_key = lookup("FLEETSHARE_API_KEY").filter(|k| !k.trim().is_empty());

        Self {
            data_path,
            port,
            api_key,
            ..defaults
        }
    }

    fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }
}
