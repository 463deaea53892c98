//! Posture geometry scorer
//!
//! Converts one frame's raw joint positions into four independent geometric
//! sub-scores: squat depth, balance, spinal angle, and knee alignment. All
//! four are computed on a [0,1] internal scale and reported as 0–100
//! integers. Joint indices follow the 33-point pose model.

use crate::types::{JointPosition, PostureSubScores, SkeletonError};

/// Joints per complete skeleton (33-point pose model)
pub const SKELETON_JOINT_COUNT: usize = 33;

const LEFT_SHOULDER: usize = 11;
const RIGHT_SHOULDER: usize = 12;
const LEFT_HIP: usize = 23;
const RIGHT_HIP: usize = 24;
const LEFT_KNEE: usize = 25;
const RIGHT_KNEE: usize = 26;
const LEFT_ANKLE: usize = 27;
const RIGHT_ANKLE: usize = 28;

/// Guards divisions against degenerate near-zero-span skeletons
const EPSILON: f64 = 1e-6;

/// Division with a sign-preserving epsilon floor on the denominator
fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    let denominator = if denominator.abs() < EPSILON {
        EPSILON.copysign(if denominator == 0.0 { 1.0 } else { denominator })
    } else {
        denominator
    };
    numerator / denominator
}

fn midpoint_y(a: &JointPosition, b: &JointPosition) -> f64 {
    (a.y + b.y) / 2.0
}

fn midpoint_x(a: &JointPosition, b: &JointPosition) -> f64 {
    (a.x + b.x) / 2.0
}

/// Score one skeleton frame
///
/// # Errors
/// `SkeletonError::IncompleteSkeleton` when fewer than 33 joints were
/// detected; callers exclude such frames from their batch.
pub fn score_frame(points: &[JointPosition]) -> Result<PostureSubScores, SkeletonError> {
    if points.len() < SKELETON_JOINT_COUNT {
        return Err(SkeletonError::IncompleteSkeleton {
            joints: points.len(),
        });
    }

    let hip_y = midpoint_y(&points[LEFT_HIP], &points[RIGHT_HIP]);
    let knee_y = midpoint_y(&points[LEFT_KNEE], &points[RIGHT_KNEE]);
    let ankle_y = midpoint_y(&points[LEFT_ANKLE], &points[RIGHT_ANKLE]);

    // Depth: in normalized image coordinates y grows downward, so a hip
    // that has dropped toward knee height (relative to the knee-to-ankle
    // span) indicates a deeper squat. Hip midway between knee and ankle
    // scores 0.5.
    let depth = guarded_div(knee_y - hip_y, knee_y - ankle_y).clamp(0.0, 1.0);

    // Back angle: torso vector from hip midpoint to shoulder midpoint,
    // flipped into y-up coordinates so an upright spine lands at +pi/2.
    // Maximal when vertical, decaying linearly to 0 at a horizontal lean.
    let hip_mid_x = midpoint_x(&points[LEFT_HIP], &points[RIGHT_HIP]);
    let shoulder_mid_x = midpoint_x(&points[LEFT_SHOULDER], &points[RIGHT_SHOULDER]);
    let shoulder_mid_y = midpoint_y(&points[LEFT_SHOULDER], &points[RIGHT_SHOULDER]);
    let dx = shoulder_mid_x - hip_mid_x;
    let dy = hip_y - shoulder_mid_y;
    let angle = dy.atan2(dx);
    let half_pi = std::f64::consts::FRAC_PI_2;
    let back_angle = 1.0 - ((angle - half_pi).abs() / half_pi).min(1.0);

    // Knee alignment: knees collapsing inward narrow the knee spread below
    // the ankle spread. Spacing at or above ankle width is not penalized
    // (the 1.2 scale forgives slightly narrow stances).
    let knee_spread = (points[LEFT_KNEE].x - points[RIGHT_KNEE].x).abs();
    let ankle_spread = (points[LEFT_ANKLE].x - points[RIGHT_ANKLE].x).abs();
    let knee_valgus =
        (guarded_div(knee_spread, ankle_spread.max(EPSILON)).clamp(0.0, 1.0) * 1.2).clamp(0.0, 1.0);

    // Balance: horizontal offset of the torso center from the frame center.
    let center_x = (shoulder_mid_x + hip_mid_x) / 2.0;
    let offset = center_x - 0.5;
    let balance = 1.0 - (offset.abs() / 0.5).min(1.0);

    Ok(PostureSubScores {
        depth: (depth * 100.0).round() as u8,
        balance: (balance * 100.0).round() as u8,
        back_angle: (back_angle * 100.0).round() as u8,
        knee_valgus: (knee_valgus * 100.0).round() as u8,
    })
}
