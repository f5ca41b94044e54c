//! API request, error and response types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::types::SimulationParameters;
use crate::store::{StoredParameters, StoredResult};

/// Body of `POST /simulations`.
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    /// Station and horizon to simulate (camelCase fields).
    pub parameters: SimulationParameters,
    /// Fixed seed for a reproducible run; omitted means a fresh random run.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Body of `GET /parameters/{id}`: the parameter set and every result run
/// with it.
#[derive(Debug, Serialize)]
pub struct ParameterSetDetail {
    #[serde(flatten)]
    pub parameter_set: StoredParameters,
    pub results: Vec<StoredResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Failures a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidInput(_) => Self::BadRequest(err.to_string()),
            SimError::EmptySeries | SimError::DegenerateInput(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
