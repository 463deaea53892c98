//! Frame sampling orchestrator
//!
//! Drives the end-to-end per-video analysis: probe the duration, plan the
//! sample instants, then work through the plan strictly sequentially,
//! extracting a frame and detecting emotions at each instant. Per-instant
//! failures are recorded and skipped; only a failed duration probe aborts
//! the whole analysis.
//!
//! Sequential execution is a correctness choice, not an optimization gap:
//! extraction and detection share one temporary-file workspace and one
//! upstream detector quota, and one bad instant must not disturb another's
//! processing.

use crate::scoring::expression::{
    expression_overall, expression_overall_from_frames, ExpressionWeights,
};
use crate::scoring::timestamps::{plan_timestamps, DEFAULT_TAIL_COUNT};
use crate::types::{
    AnalyzeError, DetectedFace, DominantEmotion, EmotionDetector, EmotionScores, FrameOutcome,
    MediaProbe, ProbeError, SampleInstant,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one full video analysis
#[derive(Debug, Clone)]
pub struct VideoAnalysis {
    /// Probed video duration in seconds
    pub duration: f64,
    /// One outcome per planned sample instant, in plan order
    pub frames: Vec<FrameOutcome>,
}

impl VideoAnalysis {
    /// Session-level expression score across all successful frames
    ///
    /// Averages each emotion label over the frames that reported it, then
    /// scores the averaged distribution. No successful frames scores 0.
    pub fn expression_overall(&self, weights: &ExpressionWeights) -> u8 {
        let distributions = self
            .frames
            .iter()
            .filter_map(|frame| frame.emotions.as_ref());
        expression_overall_from_frames(distributions, weights)
    }
}

/// Frame sampling orchestrator
///
/// Holds the two collaborators behind their capability traits so the
/// orchestration protocol is testable with scripted fakes.
pub struct FrameSampler {
    probe: Arc<dyn MediaProbe>,
    detector: Arc<dyn EmotionDetector>,
    tail_count: usize,
    weights: ExpressionWeights,
}

impl FrameSampler {
    pub fn new(probe: Arc<dyn MediaProbe>, detector: Arc<dyn EmotionDetector>) -> Self {
        Self {
            probe,
            detector,
            tail_count: DEFAULT_TAIL_COUNT,
            weights: ExpressionWeights::default(),
        }
    }

    /// Override the number of tail sample instants
    pub fn with_tail_count(mut self, tail_count: usize) -> Self {
        self.tail_count = tail_count;
        self
    }

    /// Override the expression weight table
    pub fn with_weights(mut self, weights: ExpressionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Analyze one video into an ordered sequence of frame outcomes
    ///
    /// The full sequence is returned even if every instant failed; "no
    /// usable frames" is data, not a fault.
    ///
    /// # Errors
    /// `AnalyzeError::Probe` if the duration probe errors or reports a
    /// non-finite or non-positive value. No partial results in that case.
    pub async fn analyze(&self, video: &Path) -> Result<VideoAnalysis, AnalyzeError> {
        let duration = self.probe.probe_duration(video).await?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AnalyzeError::Probe(ProbeError::InvalidDuration(duration)));
        }

        let plan = plan_timestamps(duration, self.tail_count)?;
        info!(
            duration,
            instants = plan.len(),
            probe = self.probe.name(),
            detector = self.detector.name(),
            "sampling plan built"
        );

        // Strictly sequential: no instant starts before the previous one's
        // outcome is recorded.
        let mut frames = Vec::with_capacity(plan.len());
        for instant in &plan {
            frames.push(self.sample_instant(video, instant).await);
        }

        let ok_count = frames.iter().filter(|f| f.ok).count();
        info!(ok = ok_count, total = frames.len(), "video analysis complete");

        Ok(VideoAnalysis { duration, frames })
    }

    /// Process one sample instant; every failure becomes a record
    async fn sample_instant(&self, video: &Path, instant: &SampleInstant) -> FrameOutcome {
        let image = match self.probe.extract_frame(video, instant.t).await {
            Ok(image) => image,
            Err(e) => {
                warn!(label = %instant.label, t = instant.t, error = %e, "frame extraction failed");
                return FrameOutcome::failure(instant, format!("frame extraction failed: {}", e));
            }
        };

        let faces = match self.detector.detect_faces(&image).await {
            Ok(faces) => faces,
            Err(e) => {
                warn!(label = %instant.label, t = instant.t, error = %e, "emotion detection failed");
                return FrameOutcome::failure(instant, format!("emotion detection failed: {}", e));
            }
        };

        let Some(main_face) = pick_main_face(&faces) else {
            debug!(label = %instant.label, t = instant.t, "no face detected");
            return FrameOutcome::failure(instant, "no face");
        };

        let emotions = to_emotion_scores(main_face);
        let dominant = dominant_emotion(main_face);
        let overall = expression_overall(&emotions, &self.weights);

        FrameOutcome::success(instant, emotions, dominant, overall)
    }
}

/// Pick the main face: the largest by bounding-box area
///
/// Favors the subject closest to or most prominent in camera over any
/// bystanders. Ties keep the earlier face.
fn pick_main_face(faces: &[DetectedFace]) -> Option<&DetectedFace> {
    faces.iter().fold(None, |best: Option<&DetectedFace>, face| {
        match best {
            Some(current) if face.bounding_box.area() <= current.bounding_box.area() => Some(current),
            _ => Some(face),
        }
    })
}

/// Flatten a face's readings into the label → confidence map
///
/// Confidences are clamped to [0,100]; a repeated label keeps the last
/// reading, matching the detector's own ordering.
fn to_emotion_scores(face: &DetectedFace) -> EmotionScores {
    face.emotions
        .iter()
        .map(|reading| (reading.label, reading.confidence.clamp(0.0, 100.0)))
        .collect()
}

/// Strongest emotion in detector order; on ties the first maximum wins
fn dominant_emotion(face: &DetectedFace) -> Option<DominantEmotion> {
    face.emotions
        .iter()
        .fold(None, |best: Option<DominantEmotion>, reading| match best {
            Some(current) if reading.confidence <= current.confidence => Some(current),
            _ => Some(DominantEmotion {
                label: reading.label,
                confidence: reading.confidence.clamp(0.0, 100.0),
            }),
        })
}
