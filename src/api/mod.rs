//! REST API for running simulations and reading stored results.
//!
//! Endpoints:
//! - `POST /simulations`: run a simulation and store its result
//! - `GET /parameters`: stored parameter sets
//! - `GET /parameters/{id}`: one parameter set with its results
//! - `GET /results/{id}`: one stored result

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::store::InMemoryStore;

pub use types::{ApiError, ErrorResponse, ParameterSetDetail, SimulationRequest};

/// Application state shared across all request handlers.
///
/// The store is the only mutable part; handlers hold the lock only while
/// reading or writing records, never while a simulation runs.
#[derive(Debug, Default)]
pub struct AppState {
    store: Mutex<InMemoryStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing store, e.g. one pre-filled by the CLI run.
    pub fn with_store(store: InMemoryStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, InMemoryStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("store lock poisoned".into()))
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/simulations", post(handlers::post_simulation))
        .route("/parameters", get(handlers::get_parameters))
        .route("/parameters/{id}", get(handlers::get_parameter_set))
        .route("/results/{id}", get(handlers::get_result))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
