//! Core types and collaborator trait definitions for FormCheck-VA
//!
//! Defines the data model shared by the scoring pipeline and the narrow
//! capability traits behind which the external collaborators live:
//! - **MediaProbe** — video duration probe and single-frame extraction
//! - **EmotionDetector** — face detection with emotion confidence scores
//!
//! Keeping the collaborators behind traits keeps the orchestration logic
//! fully unit-testable with scripted fake implementations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Emotion model
// ============================================================================

/// Closed set of emotion labels reported by the detector
///
/// Confidence values for each label are independent 0–100 scores, not a
/// probability distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmotionLabel {
    Happy,
    Calm,
    Surprised,
    Sad,
    Angry,
    Confused,
    Disgusted,
    Fear,
}

impl EmotionLabel {
    /// All labels, in a fixed canonical order
    pub const ALL: [EmotionLabel; 8] = [
        EmotionLabel::Happy,
        EmotionLabel::Calm,
        EmotionLabel::Surprised,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Confused,
        EmotionLabel::Disgusted,
        EmotionLabel::Fear,
    ];

    /// Canonical wire name (upper-case, as the detector reports it)
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "HAPPY",
            EmotionLabel::Calm => "CALM",
            EmotionLabel::Surprised => "SURPRISED",
            EmotionLabel::Sad => "SAD",
            EmotionLabel::Angry => "ANGRY",
            EmotionLabel::Confused => "CONFUSED",
            EmotionLabel::Disgusted => "DISGUSTED",
            EmotionLabel::Fear => "FEAR",
        }
    }

    /// Parse a detector-reported label, case-insensitively
    ///
    /// Returns `None` for labels outside the closed set; callers skip those
    /// rather than failing the frame.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
    }
}

/// Per-frame emotion confidence map (label → confidence 0–100)
///
/// Missing labels mean "not reported" and are treated as 0 by the scorer.
pub type EmotionScores = HashMap<EmotionLabel, f64>;

/// The single strongest emotion in a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantEmotion {
    pub label: EmotionLabel,
    pub confidence: f64,
}

// ============================================================================
// Sampling plan and per-instant outcomes
// ============================================================================

/// A planned point in time at which a frame is extracted and analyzed
///
/// Immutable once planned. Labels are unique within a plan: `start`,
/// `middle`, `tail_01..tail_NN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInstant {
    pub label: String,
    /// Seconds from the start of the video
    pub t: f64,
}

/// Per-instant analysis result, success or recorded failure
///
/// Created once by the frame sampler and never mutated afterwards; the full
/// ordered sequence forms the session's expression evidence. Field names are
/// part of the JSON compatibility surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub label: String,
    pub t: f64,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionScores>,
    #[serde(rename = "dominantEmotion", skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<DominantEmotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<u8>,
    #[serde(rename = "failureReason", skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl FrameOutcome {
    /// Record a successful analysis of one sample instant
    pub fn success(
        instant: &SampleInstant,
        emotions: EmotionScores,
        dominant_emotion: Option<DominantEmotion>,
        overall: u8,
    ) -> Self {
        Self {
            label: instant.label.clone(),
            t: instant.t,
            ok: true,
            emotions: Some(emotions),
            dominant_emotion,
            overall: Some(overall),
            failure_reason: None,
        }
    }

    /// Record a per-instant failure; iteration continues past these
    pub fn failure(instant: &SampleInstant, reason: impl Into<String>) -> Self {
        Self {
            label: instant.label.clone(),
            t: instant.t,
            ok: false,
            emotions: None,
            dominant_emotion: None,
            overall: None,
            failure_reason: Some(reason.into()),
        }
    }
}

// ============================================================================
// Skeleton model
// ============================================================================

/// One detected body joint in normalized frame coordinates
///
/// `x` and `y` are 0–1 within the frame (y grows downward), `z` is a
/// normalized depth, `visibility` an optional 0–1 confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

/// One sampled skeleton frame from the client-side landmark stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture timestamp in milliseconds (video time)
    pub ts: f64,
    pub points: Vec<JointPosition>,
}

/// Per-session posture sub-scores, each 0–100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureSubScores {
    pub depth: u8,
    pub balance: u8,
    pub back_angle: u8,
    pub knee_valgus: u8,
}

/// Where a posture report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    /// Scored from real landmark frames
    Computed,
    /// Presentation fallback; no landmark frames have ever been scored
    Fallback,
}

/// Posture scoring result surfaced to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureReport {
    pub overall: u8,
    pub breakdown: PostureSubScores,
    pub source: ScoreSource,
}

/// Combined posture + expression result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    pub pose_score: u8,
    pub expression_score: u8,
    pub final_score: u8,
}

// ============================================================================
// Detector output model
// ============================================================================

/// Normalized face bounding box (fractions of frame width/height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Box area, used to pick the main (most prominent) face
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One emotion reading on a detected face, in detector order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub label: EmotionLabel,
    /// Confidence 0–100
    pub confidence: f64,
}

/// One face returned by the emotion detector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,
    /// Emotion readings in the detector's original order
    pub emotions: Vec<EmotionReading>,
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Media probe/extractor collaborator
///
/// Given a video path, reports its duration or decodes a single frame at a
/// timestamp. The production implementation shells out to ffprobe/ffmpeg;
/// tests substitute scripted fakes.
#[async_trait::async_trait]
pub trait MediaProbe: Send + Sync {
    /// Implementation name for logging
    fn name(&self) -> &'static str;

    /// Probe the video's duration in seconds
    ///
    /// # Errors
    /// Returns `ProbeError` if the probe fails or reports a non-finite or
    /// non-positive duration. Probe failure is fatal to the whole analysis.
    async fn probe_duration(&self, video: &Path) -> Result<f64, ProbeError>;

    /// Extract one decoded frame (encoded image bytes) at `t` seconds
    ///
    /// # Errors
    /// Returns `ExtractionError` on decode failure; callers record the
    /// failure for that instant and continue.
    async fn extract_frame(&self, video: &Path, t: f64) -> Result<Vec<u8>, ExtractionError>;
}

/// Face/emotion detector collaborator
///
/// Given an encoded image, returns zero or more detected faces, each with a
/// confidence-scored emotion distribution.
#[async_trait::async_trait]
pub trait EmotionDetector: Send + Sync {
    /// Implementation name for logging
    fn name(&self) -> &'static str;

    /// Detect faces in an encoded image
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<DetectedFace>, DetectionError>;
}

// ============================================================================
// Error taxonomy
// ============================================================================

/// Duration probe error (fatal to the whole analysis)
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Probe process could not be spawned or awaited
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Probe ran but exited unsuccessfully
    #[error("probe process failed: {0}")]
    Process(String),

    /// Probe output could not be parsed
    #[error("probe output unparseable: {0}")]
    Parse(String),

    /// Probe reported a non-finite or non-positive duration
    #[error("probe returned invalid duration: {0}")]
    InvalidDuration(f64),
}

/// Per-instant frame extraction error (recoverable; recorded and skipped)
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Extractor process could not be spawned or its output read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Extractor ran but produced no frame
    #[error("frame extraction failed: {0}")]
    Process(String),
}

/// Emotion detection error (recoverable per instant)
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Network communication error
    #[error("network error: {0}")]
    Network(String),

    /// Detector responded with an error
    #[error("detector error: {0}")]
    Api(String),

    /// Detector response could not be parsed
    #[error("detector response unparseable: {0}")]
    Parse(String),
}

/// Skeleton rejection (recoverable; the frame is excluded from its batch)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkeletonError {
    /// Fewer joints than the full pose model produces
    #[error("incomplete skeleton: {joints} of 33 joints")]
    IncompleteSkeleton { joints: usize },
}

/// Sampling plan error
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// Duration must be finite and positive
    #[error("invalid video duration: {0}")]
    InvalidDuration(f64),
}

/// Fatal analysis error; aborts the whole request with no partial results
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("duration probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("sampling plan failed: {0}")]
    Plan(#[from] PlanError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_label_roundtrip() {
        for label in EmotionLabel::ALL {
            assert_eq!(EmotionLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(EmotionLabel::parse("happy"), Some(EmotionLabel::Happy));
        assert_eq!(EmotionLabel::parse("BORED"), None);
    }

    #[test]
    fn emotion_label_serializes_uppercase() {
        let json = serde_json::to_string(&EmotionLabel::Disgusted).unwrap();
        assert_eq!(json, "\"DISGUSTED\"");
    }

    #[test]
    fn frame_outcome_failure_omits_score_fields() {
        let instant = SampleInstant {
            label: "start".to_string(),
            t: 0.2,
        };
        let outcome = FrameOutcome::failure(&instant, "no face");
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["label"], "start");
        assert_eq!(json["ok"], false);
        assert_eq!(json["failureReason"], "no face");
        assert!(json.get("emotions").is_none());
        assert!(json.get("dominantEmotion").is_none());
        assert!(json.get("overall").is_none());
    }

    #[test]
    fn frame_outcome_success_uses_wire_field_names() {
        let instant = SampleInstant {
            label: "middle".to_string(),
            t: 10.0,
        };
        let mut emotions = EmotionScores::new();
        emotions.insert(EmotionLabel::Happy, 80.0);

        let outcome = FrameOutcome::success(
            &instant,
            emotions,
            Some(DominantEmotion {
                label: EmotionLabel::Happy,
                confidence: 80.0,
            }),
            64,
        );
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["emotions"]["HAPPY"], 80.0);
        assert_eq!(json["dominantEmotion"]["label"], "HAPPY");
        assert_eq!(json["overall"], 64);
        assert!(json.get("failureReason").is_none());
    }

    #[test]
    fn bounding_box_area() {
        let bb = BoundingBox {
            left: 0.1,
            top: 0.1,
            width: 0.5,
            height: 0.4,
        };
        assert!((bb.area() - 0.2).abs() < 1e-12);
    }
}
