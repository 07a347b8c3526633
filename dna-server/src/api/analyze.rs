//! Stateless transcript analysis
//!
//! Scores a single transcript against a fresh profile. Nothing is stored.

use axum::{extract::State, routing::post, Json, Router};
use dna_common::{NarrativeProfile, TranscriptAnalysis};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub profile: NarrativeProfile,
    pub analysis: TranscriptAnalysis,
}

/// POST /api/analyze
pub async fn analyze_transcript(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    if request.transcript.trim().is_empty() {
        return Err(ApiError::BadRequest("transcript must not be empty".to_string()));
    }

    let (profile, analysis) = state.engine.preview(&request.transcript);
    tracing::debug!(matches = analysis.matches.len(), "Analyzed standalone transcript");

    Ok(Json(AnalyzeResponse { profile, analysis }))
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_transcript))
}
