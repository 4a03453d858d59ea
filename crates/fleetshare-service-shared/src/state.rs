//! Application state for the fleetshare HTTP service.
//!
//! Handlers reach the shared [`Fleet`] through axum's `State` extractor. The
//! fleet itself is internally synchronised, so the state only needs `Arc`
//! sharing.

use std::path::Path;
use std::sync::Arc;

use fleetshare_lib::{Error as LibError, Fleet};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Dataset file not found.
    DatasetNotFound(String),

    /// Failed to load the fleet dataset.
    FleetLoad(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetNotFound(path) => write!(f, "fleet dataset not found: {}", path),
            Self::FleetLoad(e) => write!(f, "failed to load fleet: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FleetLoad(e) => Some(e),
            Self::DatasetNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::FleetLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable; every clone sees the same fleet.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use fleetshare_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let vehicles = state.fleet().vehicles();
///     // ...
/// }
///
/// let state = AppState::load("/data/fleet.db")?;
/// let app = Router::new()
///     .route("/api/v1/vehicles", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    fleet: Fleet,
    api_key: Option<String>,
}

impl AppState {
    /// Load application state from a fleet dataset (SQLite or JSON).
    pub fn load(data_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let data_path = data_path.as_ref();

        if !data_path.exists() {
            return Err(AppStateError::DatasetNotFound(
                data_path.display().to_string(),
            ));
        }

        tracing::info!(path = %data_path.display(), "loading fleet dataset");
        let fleet = Fleet::load(data_path)?;

        Ok(Self::from_fleet(fleet))
    }

    /// Wrap an already constructed fleet.
    pub fn from_fleet(fleet: Fleet) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                fleet,
                api_key: None,
            }),
        }
    }

    /// Require `api_key` on every `/api/v1` request. Empty keys are ignored.
    pub fn with_api_key(self, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self {
            inner: Arc::new(AppStateInner {
                fleet: self.inner.fleet.clone(),
                api_key,
            }),
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.inner.fleet
    }

    /// Configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.inner.api_key.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("fleet", &self.inner.fleet)
            .field("api_key_configured", &self.inner.api_key.is_some())
            .finish()
    }
}
