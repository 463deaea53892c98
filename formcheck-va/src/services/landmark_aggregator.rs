//! Landmark batch aggregator
//!
//! Turns a live, high-rate stream of per-frame skeletons into periodically
//! refreshed posture sub-scores without overwhelming the scorer. A sampling
//! gate (minimum inter-sample gap) and a batch-size threshold are the only
//! backpressure; the producer never blocks on a flush.
//!
//! Flushing is non-reentrant: an explicit in-flight flag guarantees at most
//! one scoring pass at a time, and frames accepted during a flush accumulate
//! into the next pending batch. The pending batch is drained on each flush
//! attempt, never copied and cleared separately, and the running scores are
//! replaced atomically per flush.

use crate::scoring::clamp_score;
use crate::scoring::posture::score_frame;
use crate::types::{LandmarkFrame, PostureReport, PostureSubScores, ScoreSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Default minimum gap between accepted frames (≈10 Hz sampling)
pub const DEFAULT_SAMPLE_GAP_MS: f64 = 100.0;

/// Default number of accepted frames per flushed batch
pub const DEFAULT_BATCH_SIZE: usize = 12;

/// Weights folding the four sub-scores into the posture overall
const DEPTH_WEIGHT: f64 = 0.35;
const BALANCE_WEIGHT: f64 = 0.25;
const BACK_ANGLE_WEIGHT: f64 = 0.20;
const KNEE_VALGUS_WEIGHT: f64 = 0.20;

/// Fixed demo report served before any landmark frame has been scored
///
/// A presentation fallback so a dependent UI has something non-null to
/// render, distinguishable from a computed result by its source tag.
const FALLBACK_REPORT: PostureReport = PostureReport {
    overall: 72,
    breakdown: PostureSubScores {
        depth: 80,
        balance: 70,
        back_angle: 68,
        knee_valgus: 60,
    },
    source: ScoreSource::Fallback,
};

struct Pending {
    frames: Vec<LandmarkFrame>,
    last_accepted_ms: Option<f64>,
}

struct Inner {
    min_sample_gap_ms: f64,
    batch_size: usize,
    pending: Mutex<Pending>,
    flush_in_flight: AtomicBool,
    current: RwLock<Option<PostureReport>>,
}

/// Landmark batch aggregator; cheap to clone, all clones share state
#[derive(Clone)]
pub struct LandmarkAggregator {
    inner: Arc<Inner>,
}

impl Default for LandmarkAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkAggregator {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SAMPLE_GAP_MS, DEFAULT_BATCH_SIZE)
    }

    /// Aggregator with a custom sampling gate and batch threshold
    pub fn with_limits(min_sample_gap_ms: f64, batch_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                min_sample_gap_ms,
                batch_size: batch_size.max(1),
                pending: Mutex::new(Pending {
                    frames: Vec::new(),
                    last_accepted_ms: None,
                }),
                flush_in_flight: AtomicBool::new(false),
                current: RwLock::new(None),
            }),
        }
    }

    /// Offer one streamed frame to the sampling gate
    ///
    /// The frame is accepted only if the minimum inter-sample gap has
    /// elapsed since the last accepted frame. Reaching the batch threshold
    /// triggers a flush; if one is already in flight the frames simply keep
    /// accumulating into the next batch.
    pub async fn push(&self, frame: LandmarkFrame) {
        let threshold_reached = {
            let mut pending = self.inner.pending.lock().await;
            let accepted = match pending.last_accepted_ms {
                Some(last) => frame.ts - last >= self.inner.min_sample_gap_ms,
                None => true,
            };
            if !accepted {
                return;
            }
            pending.last_accepted_ms = Some(frame.ts);
            pending.frames.push(frame);
            pending.frames.len() >= self.inner.batch_size
        };

        if threshold_reached {
            self.flush().await;
        }
    }

    /// Flush the pending batch into the running posture scores
    ///
    /// No-op while another flush is in flight or when the pending batch is
    /// empty. A batch with zero complete skeletons produces no update; the
    /// prior score stands.
    pub async fn flush(&self) {
        if self
            .inner
            .flush_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let batch = {
            let mut pending = self.inner.pending.lock().await;
            std::mem::take(&mut pending.frames)
        };

        if !batch.is_empty() {
            if let Some(report) = score_batch(&batch) {
                info!(
                    frames = batch.len(),
                    overall = report.overall,
                    "posture batch scored"
                );
                *self.inner.current.write().await = Some(report);
            } else {
                debug!(frames = batch.len(), "batch had no complete skeletons");
            }
        }

        self.inner.flush_in_flight.store(false, Ordering::Release);
    }

    /// Score a pre-assembled batch and fold it into the running scores
    ///
    /// Used by the scoring endpoint, whose clients batch frames themselves.
    /// Returns the resulting report; a batch with no complete skeletons
    /// leaves the prior report in place and returns it.
    pub async fn submit_batch(&self, frames: &[LandmarkFrame]) -> PostureReport {
        if let Some(report) = score_batch(frames) {
            *self.inner.current.write().await = Some(report);
            report
        } else {
            self.snapshot().await
        }
    }

    /// Current posture report, or the demo fallback if nothing has ever
    /// been scored
    pub async fn snapshot(&self) -> PostureReport {
        self.inner.current.read().await.unwrap_or(FALLBACK_REPORT)
    }

    /// Final best-effort flush on teardown
    ///
    /// Swallows nothing today (flushing cannot fail), but stays the single
    /// place teardown goes through so partially filled batches are not lost.
    pub async fn finish(&self) {
        debug!("final landmark flush");
        self.flush().await;
    }
}

/// Average the scorable frames of one batch into a posture report
///
/// Frames with incomplete skeletons are excluded and do not count toward
/// the divisor. Returns `None` when no frame in the batch was scorable.
fn score_batch(frames: &[LandmarkFrame]) -> Option<PostureReport> {
    let mut depth_sum = 0.0;
    let mut balance_sum = 0.0;
    let mut back_angle_sum = 0.0;
    let mut knee_valgus_sum = 0.0;
    let mut valid = 0usize;

    for frame in frames {
        match score_frame(&frame.points) {
            Ok(scores) => {
                depth_sum += scores.depth as f64;
                balance_sum += scores.balance as f64;
                back_angle_sum += scores.back_angle as f64;
                knee_valgus_sum += scores.knee_valgus as f64;
                valid += 1;
            }
            Err(e) => {
                debug!(ts = frame.ts, error = %e, "skeleton frame skipped");
            }
        }
    }

    if valid == 0 {
        return None;
    }

    let divisor = valid as f64;
    let breakdown = PostureSubScores {
        depth: clamp_score(depth_sum / divisor),
        balance: clamp_score(balance_sum / divisor),
        back_angle: clamp_score(back_angle_sum / divisor),
        knee_valgus: clamp_score(knee_valgus_sum / divisor),
    };
    let overall = clamp_score(
        DEPTH_WEIGHT * breakdown.depth as f64
            + BALANCE_WEIGHT * breakdown.balance as f64
            + BACK_ANGLE_WEIGHT * breakdown.back_angle as f64
            + KNEE_VALGUS_WEIGHT * breakdown.knee_valgus as f64,
    );

    Some(PostureReport {
        overall,
        breakdown,
        source: ScoreSource::Computed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::posture::SKELETON_JOINT_COUNT;
    use crate::types::JointPosition;

    fn joint(x: f64, y: f64) -> JointPosition {
        JointPosition {
            x,
            y,
            z: 0.0,
            visibility: Some(1.0),
        }
    }

    /// Mid-squat reference skeleton: depth 50, other sub-scores 100
    fn mid_squat_points() -> Vec<JointPosition> {
        let mut points = vec![joint(0.5, 0.5); SKELETON_JOINT_COUNT];
        points[11] = joint(0.45, 0.3); // left shoulder
        points[12] = joint(0.55, 0.3); // right shoulder
        points[23] = joint(0.45, 0.8); // left hip
        points[24] = joint(0.55, 0.8); // right hip
        points[25] = joint(0.4, 0.7); // left knee
        points[26] = joint(0.6, 0.7); // right knee
        points[27] = joint(0.4, 0.9); // left ankle
        points[28] = joint(0.6, 0.9); // right ankle
        points
    }

    fn valid_frame(ts: f64) -> LandmarkFrame {
        LandmarkFrame {
            ts,
            points: mid_squat_points(),
        }
    }

    fn incomplete_frame(ts: f64) -> LandmarkFrame {
        LandmarkFrame {
            ts,
            points: vec![joint(0.5, 0.5); 5],
        }
    }

    #[tokio::test]
    async fn fallback_before_any_frames() {
        let aggregator = LandmarkAggregator::new();
        let report = aggregator.snapshot().await;

        assert_eq!(report.source, ScoreSource::Fallback);
        assert_eq!(report.overall, 72);
        assert_eq!(report.breakdown.depth, 80);
        assert_eq!(report.breakdown.balance, 70);
        assert_eq!(report.breakdown.back_angle, 68);
        assert_eq!(report.breakdown.knee_valgus, 60);
    }

    #[tokio::test]
    async fn incomplete_frames_do_not_count_toward_the_divisor() {
        let aggregator = LandmarkAggregator::new();
        let mut frames: Vec<LandmarkFrame> =
            (0..7).map(|i| valid_frame(i as f64 * 100.0)).collect();
        frames.extend((7..12).map(|i| incomplete_frame(i as f64 * 100.0)));

        let report = aggregator.submit_batch(&frames).await;

        assert_eq!(report.source, ScoreSource::Computed);
        // 7 valid mid-squat frames average to exactly the per-frame scores;
        // a divisor of 12 would have dragged depth down to 29.
        assert_eq!(report.breakdown.depth, 50);
        assert_eq!(report.breakdown.balance, 100);
        assert_eq!(report.breakdown.back_angle, 100);
        assert_eq!(report.breakdown.knee_valgus, 100);
        // 0.35*50 + 0.25*100 + 0.20*100 + 0.20*100 = 82.5
        assert_eq!(report.overall, 83);
    }

    #[tokio::test]
    async fn zero_valid_batch_leaves_prior_score_standing() {
        let aggregator = LandmarkAggregator::new();
        let computed = aggregator.submit_batch(&[valid_frame(0.0)]).await;
        assert_eq!(computed.source, ScoreSource::Computed);

        let after = aggregator
            .submit_batch(&[incomplete_frame(100.0), incomplete_frame(200.0)])
            .await;
        assert_eq!(after, computed);
        assert_eq!(aggregator.snapshot().await, computed);
    }

    #[tokio::test]
    async fn sampling_gate_rejects_frames_inside_the_gap() {
        // Gate 100ms, batch 3: of ts 0,50,100,150,200 only 0/100/200 pass.
        let aggregator = LandmarkAggregator::with_limits(100.0, 3);
        for ts in [0.0, 50.0, 100.0, 150.0, 200.0] {
            aggregator.push(valid_frame(ts)).await;
        }
        // Exactly three accepted frames reached the threshold and flushed.
        assert_eq!(aggregator.snapshot().await.source, ScoreSource::Computed);

        // Same cadence but stopping short of the threshold: no flush.
        let idle = LandmarkAggregator::with_limits(100.0, 3);
        for ts in [0.0, 50.0, 100.0, 150.0] {
            idle.push(valid_frame(ts)).await;
        }
        assert_eq!(idle.snapshot().await.source, ScoreSource::Fallback);
    }

    #[tokio::test]
    async fn finish_flushes_a_partial_batch() {
        let aggregator = LandmarkAggregator::with_limits(100.0, 100);
        for ts in [0.0, 100.0, 200.0] {
            aggregator.push(valid_frame(ts)).await;
        }
        assert_eq!(aggregator.snapshot().await.source, ScoreSource::Fallback);

        aggregator.finish().await;
        let report = aggregator.snapshot().await;
        assert_eq!(report.source, ScoreSource::Computed);
        assert_eq!(report.breakdown.depth, 50);
    }

    #[tokio::test]
    async fn finish_with_nothing_pending_is_a_no_op() {
        let aggregator = LandmarkAggregator::new();
        aggregator.finish().await;
        assert_eq!(aggregator.snapshot().await.source, ScoreSource::Fallback);
    }

    #[tokio::test]
    async fn flush_drains_the_pending_batch() {
        let aggregator = LandmarkAggregator::with_limits(100.0, 100);
        aggregator.push(valid_frame(0.0)).await;
        aggregator.flush().await;
        let first = aggregator.snapshot().await;
        assert_eq!(first.source, ScoreSource::Computed);

        // A second flush finds nothing pending and must not rescore.
        aggregator.flush().await;
        assert_eq!(aggregator.snapshot().await, first);
    }
}
