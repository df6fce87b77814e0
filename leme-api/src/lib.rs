//! leme-api library - learning track suggestion and success prediction
//!
//! Serves two pre-trained models over HTTP: a classifier that suggests a
//! learning track for a learner profile and a regressor that estimates the
//! learner's completion success rate.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod artifacts;
pub mod catalog;
pub mod decision;
pub mod encoder;
pub mod error;
pub mod model;
pub mod prediction;
pub mod service;

pub use service::PredictionService;

/// Request limits applied by the HTTP layer
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded models, encoders and catalog (read-only)
    pub service: Arc<PredictionService>,
    pub limits: HttpLimits,
}

impl AppState {
    /// Create new application state
    pub fn new(service: PredictionService, limits: HttpLimits) -> Self {
        Self {
            service: Arc::new(service),
            limits,
        }
    }
}

/// Build application router
///
/// `/suggest_trilha` and `/predict_sucesso` are kept for older clients.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let limits = state.limits;

    let predictions = Router::new()
        .route("/suggest_track", post(api::suggest_track))
        .route("/predict_success", post(api::predict_success))
        .route("/suggest_trilha", post(api::suggest_track))
        .route("/predict_sucesso", post(api::predict_success));

    Router::new()
        .merge(predictions)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
