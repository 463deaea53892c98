//! Pure scoring components
//!
//! Everything in this module is deterministic and side-effect free: the
//! sampling planner, the two per-axis scorers, the final composer, and the
//! rule-based coaching comments. Orchestration lives in `services`.

pub mod comments;
pub mod composite;
pub mod expression;
pub mod posture;
pub mod timestamps;

/// Clamp a raw weighted sum onto the surfaced 0–100 integer scale
///
/// Out-of-range and non-finite upstream values must never escape as an
/// out-of-range score.
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
