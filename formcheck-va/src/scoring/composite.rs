//! Final score composer
//!
//! Fuses the posture and expression composite scores into the single
//! coached score under fixed weights. Pure function, no state.

use crate::scoring::clamp_score;
use crate::types::CompositeResult;

/// Default posture weight in the final score
pub const DEFAULT_POSE_WEIGHT: f64 = 0.7;
/// Default expression weight in the final score
pub const DEFAULT_EXPR_WEIGHT: f64 = 0.3;

/// Weighted final score on the 0–100 scale
///
/// Inputs are clamped to [0,100] before weighting so malformed upstream
/// values cannot leak through; caller-supplied weights are trusted as given
/// and are not required to sum to 1. The weighted sum is clamped again on
/// the way out.
pub fn final_score(pose: f64, expression: f64, pose_weight: f64, expr_weight: f64) -> u8 {
    let pose = if pose.is_finite() {
        pose.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let expression = if expression.is_finite() {
        expression.clamp(0.0, 100.0)
    } else {
        0.0
    };
    clamp_score(pose_weight * pose + expr_weight * expression)
}

/// Compose the two axis scores under the default 0.7/0.3 weights
pub fn compose(pose: u8, expression: u8) -> CompositeResult {
    CompositeResult {
        pose_score: pose,
        expression_score: expression,
        final_score: final_score(
            pose as f64,
            expression as f64,
            DEFAULT_POSE_WEIGHT,
            DEFAULT_EXPR_WEIGHT,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_fixtures() {
        assert_eq!(final_score(100.0, 0.0, 0.7, 0.3), 70);
        assert_eq!(final_score(0.0, 0.0, 0.7, 0.3), 0);
        assert_eq!(final_score(100.0, 100.0, 0.7, 0.3), 100);
        assert_eq!(final_score(80.0, 60.0, 0.7, 0.3), 74);
    }

    #[test]
    fn out_of_range_inputs_clamp_before_weighting() {
        // 150 clamps to 100 first: 0.7 * 100 = 70, not 105.
        assert_eq!(final_score(150.0, 0.0, 0.7, 0.3), 70);
        assert_eq!(final_score(-50.0, 100.0, 0.7, 0.3), 30);
        assert_eq!(final_score(f64::NAN, f64::INFINITY, 0.7, 0.3), 0);
    }

    #[test]
    fn caller_weights_are_trusted() {
        // Weights need not sum to 1; only the output is clamped.
        assert_eq!(final_score(100.0, 100.0, 0.9, 0.9), 100);
        assert_eq!(final_score(50.0, 50.0, 0.2, 0.2), 20);
    }

    #[test]
    fn compose_uses_default_weights() {
        let result = compose(100, 0);
        assert_eq!(result.pose_score, 100);
        assert_eq!(result.expression_score, 0);
        assert_eq!(result.final_score, 70);
    }
}
