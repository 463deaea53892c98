//! Emotion composite scorer
//!
//! Folds a per-frame emotion confidence distribution into a single bounded
//! expression score via a fixed weighted sum. Weights are design constants,
//! overridable per call for tuning but never learned.

use crate::scoring::clamp_score;
use crate::types::{EmotionLabel, EmotionScores};
use std::collections::HashMap;

/// Weighted contribution of each emotion label to the expression score
///
/// Labels absent from the table contribute nothing. Positive weights reward
/// engaged, composed expressions; negative weights penalize strain markers.
#[derive(Debug, Clone)]
pub struct ExpressionWeights {
    weights: HashMap<EmotionLabel, f64>,
}

impl Default for ExpressionWeights {
    fn default() -> Self {
        let mut weights = HashMap::new();
        weights.insert(EmotionLabel::Happy, 0.5);
        weights.insert(EmotionLabel::Surprised, 0.2);
        weights.insert(EmotionLabel::Calm, 0.5);
        weights.insert(EmotionLabel::Angry, -0.2);
        weights.insert(EmotionLabel::Disgusted, -0.2);
        Self { weights }
    }
}

impl ExpressionWeights {
    /// Default weight table
    pub fn new() -> Self {
        Self::default()
    }

    /// Default weights with per-call overrides merged on top
    pub fn with_overrides(overrides: &HashMap<EmotionLabel, f64>) -> Self {
        let mut base = Self::default();
        for (&label, &weight) in overrides {
            base.weights.insert(label, weight);
        }
        base
    }

    /// Weight for one label (0 when unlisted)
    pub fn weight(&self, label: EmotionLabel) -> f64 {
        self.weights.get(&label).copied().unwrap_or(0.0)
    }
}

/// Score one frame's emotion distribution on the 0–100 scale
///
/// Missing labels count as 0; confidences are clamped to [0,100] before
/// weighting. Negative weighted sums clamp to 0, sums above 100 to 100.
/// Order-independent over how the map was constructed.
pub fn expression_overall(emotions: &EmotionScores, weights: &ExpressionWeights) -> u8 {
    let sum: f64 = emotions
        .iter()
        .map(|(&label, &confidence)| weights.weight(label) * confidence.clamp(0.0, 100.0))
        .sum();
    clamp_score(sum)
}

/// Score a whole session's worth of per-frame distributions
///
/// Each label's confidence is averaged across the frames that report it
/// (frames missing a label do not drag that label's average toward zero),
/// then the averaged distribution is scored like a single frame. No frames
/// at all scores 0.
pub fn expression_overall_from_frames<'a, I>(frames: I, weights: &ExpressionWeights) -> u8
where
    I: IntoIterator<Item = &'a EmotionScores>,
{
    let mut sums: HashMap<EmotionLabel, (f64, usize)> = HashMap::new();
    for frame in frames {
        for (&label, &confidence) in frame {
            let entry = sums.entry(label).or_insert((0.0, 0));
            entry.0 += confidence.clamp(0.0, 100.0);
            entry.1 += 1;
        }
    }

    let averaged: EmotionScores = sums
        .into_iter()
        .map(|(label, (total, count))| (label, total / count as f64))
        .collect();
    expression_overall(&averaged, weights)
}
