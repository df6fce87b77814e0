//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub models_loaded: bool,
    pub tracks_available: usize,
    pub version: String,
}

/// GET /health
///
/// The service only starts listening once every artifact has loaded, so a
/// response here always reports the models as loaded.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: leme_common::time::now_iso8601(),
        models_loaded: true,
        tracks_available: state.service.catalog().len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
