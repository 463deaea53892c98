//! Posture scoring API handler
//!
//! POST /score/posture — accepts a batch of sampled landmark frames from
//! the client-side stream and returns the refreshed posture scores plus
//! coaching comments.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ApiResult,
    scoring::comments::coaching_comments,
    types::{LandmarkFrame, PostureSubScores, ScoreSource},
    AppState,
};

/// Posture scoring request
#[derive(Debug, Deserialize)]
pub struct ScorePostureRequest {
    /// Batched landmark frames; empty or absent requests the fallback
    #[serde(default)]
    pub frames: Vec<LandmarkFrame>,
}

/// Posture scoring response
#[derive(Debug, Serialize)]
pub struct ScorePostureResponse {
    pub ok: bool,
    pub overall: u8,
    pub breakdown: PostureSubScores,
    pub comments: Vec<String>,
    pub source: ScoreSource,
}

/// POST /score/posture
pub async fn score_posture(
    State(state): State<AppState>,
    Json(request): Json<ScorePostureRequest>,
) -> ApiResult<Json<ScorePostureResponse>> {
    let report = if request.frames.is_empty() {
        debug!("empty landmark batch; serving current report");
        state.aggregator.snapshot().await
    } else {
        state.aggregator.submit_batch(&request.frames).await
    };

    let comments = coaching_comments(&report.breakdown, report.overall);

    Ok(Json(ScorePostureResponse {
        ok: true,
        overall: report.overall,
        breakdown: report.breakdown,
        comments,
        source: report.source,
    }))
}

/// Build posture scoring routes
pub fn posture_routes() -> Router<AppState> {
    Router::new().route("/score/posture", post(score_posture))
}
