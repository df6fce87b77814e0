//! HTTP error mapping
//!
//! Every error leaves the service as `{"error": message}` with a status code
//! chosen by category. Internal failures are logged with full detail but the
//! client only receives a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::ServingError;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or empty body, missing or malformed field
    #[error("{0}")]
    InvalidRequest(String),

    /// Categorical value outside the trained vocabulary
    #[error("{0}")]
    InvalidCategory(String),

    /// Resolved track key absent from the catalog
    #[error("Track {0} not found in catalog")]
    TrackNotFound(String),

    /// Anything unexpected on the prediction path (detail is server-side only)
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Convert a pipeline error, logging it against the endpoint that hit it
    pub fn from_serving(endpoint: &str, err: ServingError) -> Self {
        match err {
            ServingError::InvalidCategory { .. } => {
                warn!("{}: {}", endpoint, err);
                ApiError::InvalidCategory(err.to_string())
            }
            ServingError::TrackNotFound(key) => {
                error!("{}: track {} not found in catalog", endpoint, key);
                ApiError::TrackNotFound(key)
            }
            ServingError::FeatureSchemaMismatch { .. } | ServingError::Model(_) => {
                error!("{}: prediction failed: {}", endpoint, err);
                ApiError::Internal(err.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            ApiError::TrackNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
