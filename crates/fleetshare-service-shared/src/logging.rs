//! Structured logging setup for the fleetshare service.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: `json` (default), `compact`, or `pretty` (`text` is an
//!   alias for `compact`)
//! - `RUST_LOG`: filter directives (default: [`DEFAULT_FILTER`])
//! - `SERVICE_NAME`: reported in the startup line
//!
//! # Example
//!
//! ```no_run
//! use fleetshare_service_shared::logging::{LoggingConfig, init_logging};
//!
//! let config = LoggingConfig::from_env();
//! init_logging(&config);
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparseable. Enables the
/// per-request spans emitted by tower-http's `TraceLayer`.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug";

const DEFAULT_SERVICE_NAME: &str = "fleetshare";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, carrying the current request span.
    #[default]
    Json,
    /// Single-line human-readable output.
    Compact,
    /// Multi-line output with span context, for local debugging.
    Pretty,
}

impl LogFormat {
    /// Unrecognised names fall back to JSON.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => LogFormat::Compact,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `fleetshare_lib=debug,info`.
    pub filter: String,
    pub service: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: DEFAULT_FILTER.to_string(),
            service: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            format: set("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.format),
            filter: set("RUST_LOG").unwrap_or(defaults.filter),
            service: set("SERVICE_NAME"),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }

    /// The configured filter, or [`DEFAULT_FILTER`] when the directives do
    /// not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    tracing::info!(
        service = config.service_name(),
        format = ?config.format,
        filter = %config.filter,
        "logging initialised"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("TEXT"), LogFormat::Compact);
        assert_eq!(LogFormat::parse(" pretty "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Json);
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = LoggingConfig::from_lookup(lookup(&[]));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.service_name(), "fleetshare");
    }

    #[test]
    fn test_reads_variables_and_ignores_blanks() {
        let config = LoggingConfig::from_lookup(lookup(&[
            ("LOG_FORMAT", "compact"),
            ("RUST_LOG", "fleetshare_lib=debug"),
            ("SERVICE_NAME", "  "),
        ]));
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.filter, "fleetshare_lib=debug");
        assert_eq!(config.service, None);
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let config = LoggingConfig {
            filter: "fleetshare_lib=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.env_filter().to_string(),
            EnvFilter::new(DEFAULT_FILTER).to_string()
        );
    }

    #[test]
    fn test_with_service() {
        let config = LoggingConfig::default().with_service("fleetshare-eu");
        assert_eq!(config.service_name(), "fleetshare-eu");
    }
}
