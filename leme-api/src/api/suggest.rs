//! Track suggestion endpoint

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::request::parse_profile;
use crate::catalog::ModuleDescriptor;
use crate::AppState;

/// Suggested track with its full module listing
#[derive(Debug, Serialize)]
pub struct SuggestTrackResponse {
    /// Catalog key of the suggested track (variant marker removed)
    pub track_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<Uuid>,
    /// Display name
    pub track: String,
    pub modules: Vec<ModuleDescriptor>,
    pub confidence: f64,
    pub adaptations: Vec<String>,
}

/// POST /suggest_track
///
/// Request: `{area, accessibility, modules_completed?, days_on_platform?}`
pub async fn suggest_track(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuggestTrackResponse>, ApiError> {
    let profile = parse_profile(&body)?;
    info!("/suggest_track request: {:?}", profile);

    let suggestion = state
        .service
        .suggest_track(&profile)
        .map_err(|e| ApiError::from_serving("/suggest_track", e))?;

    info!(
        "✓ Suggestion: {} (predicted {}, confidence {:.1}%)",
        suggestion.track_key,
        suggestion.predicted_key,
        suggestion.confidence * 100.0
    );

    Ok(Json(SuggestTrackResponse {
        track_key: suggestion.track_key,
        track_id: suggestion.track.id,
        track: suggestion.track.display_name.clone(),
        modules: suggestion.track.modules.clone(),
        confidence: suggestion.confidence,
        adaptations: suggestion
            .adaptations
            .iter()
            .map(|tag| tag.to_string())
            .collect(),
    }))
}
