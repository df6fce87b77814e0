//! Success prediction endpoint

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;

use super::error::ApiError;
use super::request::parse_profile;
use crate::decision::SuccessCategory;
use crate::AppState;

/// Predicted completion success
#[derive(Debug, Serialize)]
pub struct PredictSuccessResponse {
    /// In `[0, 1]`, rounded to 3 decimals
    pub success_rate: f64,
    pub category: SuccessCategory,
    pub recommendation: String,
}

/// POST /predict_success
///
/// Request: `{area, accessibility, modules_completed?, days_on_platform?}`
pub async fn predict_success(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictSuccessResponse>, ApiError> {
    let profile = parse_profile(&body)?;
    info!("/predict_success request: {:?}", profile);

    let estimate = state
        .service
        .predict_success(&profile)
        .map_err(|e| ApiError::from_serving("/predict_success", e))?;

    info!(
        "✓ Prediction: {:.1}% ({})",
        estimate.success_rate * 100.0,
        estimate.category.as_str()
    );

    Ok(Json(PredictSuccessResponse {
        success_rate: estimate.success_rate,
        category: estimate.category,
        recommendation: estimate.category.recommendation().to_string(),
    }))
}
