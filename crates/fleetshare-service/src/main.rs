//! Fleetshare HTTP service binary.
//!
//! # Configuration
//!
//! - `FLEETSHARE_DATA_PATH` - Fleet dataset, SQLite or JSON (default: /data/fleet.db)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `FLEETSHARE_API_KEY` - Required `api_key` for `/api/v1` routes (default: none)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus exporter

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info};

use fleetshare_service_shared::{init_logging, init_metrics, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();
    init_logging(&config.logging);

    if config.metrics.enabled {
        if let Err(e) = init_metrics(&config.metrics) {
            // Metrics are optional
            tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
        }
    }

    info!(
        data_path = %config.data_path.display(),
        port = config.port,
        auth = config.api_key.is_some(),
        "starting fleetshare service"
    );

    let state = AppState::load(&config.data_path)
        .inspect_err(|e| error!(error = %e, "failed to load application state"))
        .with_context(|| format!("loading fleet from {}", config.data_path.display()))?
        .with_api_key(config.api_key.clone());

    let vehicles = state.fleet().vehicles().context("reading fleet")?;
    info!(
        vehicles = vehicles.len(),
        riders = state.fleet().riders().len(),
        "application state loaded"
    );

    let app = fleetshare_service::app(state, &config.metrics.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
