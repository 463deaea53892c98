//! Video analysis API handler
//!
//! POST /analyze — accepts a multipart video upload, runs the frame
//! sampling pipeline, and returns the per-instant outcome sequence.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    types::FrameOutcome,
    AppState,
};

/// Analysis response; field names are part of the compatibility surface
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub ok: bool,
    /// Probed video duration in seconds
    pub duration: f64,
    /// Per-instant outcomes in plan order
    pub frames: Vec<FrameOutcome>,
}

/// POST /analyze
///
/// Expects a multipart field named `video` carrying the video payload.
/// A non-video media type fails with 415; a failed duration probe aborts
/// with no partial results.
pub async fn analyze_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let mut payload: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("video") {
            let declared = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            payload = Some((declared, bytes.to_vec()));
            break;
        }
    }

    let (declared, bytes) = payload
        .ok_or_else(|| ApiError::BadRequest("missing multipart field: video".to_string()))?;
    validate_media_type(declared.as_deref(), &bytes)?;

    // Per-request workspace shared by the whole sequential sampling pass;
    // dropped (and deleted) when the analysis finishes.
    let workspace = tempfile::Builder::new().prefix("formcheck-vid-").tempdir()?;
    let video_path = workspace.path().join("input.mp4");
    tokio::fs::write(&video_path, &bytes).await?;
    info!(bytes = bytes.len(), "video upload saved for analysis");

    let analysis = match state.sampler.analyze(&video_path).await {
        Ok(analysis) => analysis,
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            return Err(e.into());
        }
    };

    Ok(Json(AnalyzeResponse {
        ok: true,
        duration: analysis.duration,
        frames: analysis.frames,
    }))
}

/// Require a declared `video/*` media type, sniffing as a backstop when
/// the client declared nothing
fn validate_media_type(declared: Option<&str>, bytes: &[u8]) -> Result<(), ApiError> {
    match declared {
        Some(media_type) if media_type.starts_with("video/") => Ok(()),
        Some(media_type) => Err(ApiError::UnsupportedMediaType(format!(
            "not a video media type: {}",
            media_type
        ))),
        None => match infer::get(bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Video => Ok(()),
            _ => Err(ApiError::UnsupportedMediaType(
                "payload is not a recognizable video".to_string(),
            )),
        },
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_video))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_video_type_passes() {
        assert!(validate_media_type(Some("video/mp4"), &[]).is_ok());
        assert!(validate_media_type(Some("video/webm"), &[]).is_ok());
    }

    #[test]
    fn declared_non_video_type_is_rejected() {
        let result = validate_media_type(Some("text/plain"), &[]);
        assert!(matches!(result, Err(ApiError::UnsupportedMediaType(_))));
    }

    #[test]
    fn undeclared_type_falls_back_to_sniffing() {
        // MP4 ftyp box; enough for the matcher.
        let mp4_header = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42mp41";
        assert!(validate_media_type(None, mp4_header).is_ok());
        assert!(validate_media_type(None, b"plain text payload").is_err());
    }
}
