//! Rule-based coaching comments
//!
//! Deterministic text selected by thresholding each posture sub-score and
//! the overall score against fixed cutoffs. A direct consumer of the
//! scoring contract, not part of it; failures here are cosmetic and must
//! never affect a score.

use crate::types::PostureSubScores;

/// Sub-scores below this cutoff trigger a corrective tip
const TIP_THRESHOLD: u8 = 70;

/// Generate coaching comments for a posture result
///
/// The first comment always summarizes the overall score tier; each
/// sub-score below the cutoff adds its corrective tip. Deterministic given
/// the same scores.
pub fn coaching_comments(breakdown: &PostureSubScores, overall: u8) -> Vec<String> {
    let mut comments = Vec::new();

    if overall >= 85 {
        comments.push("Great overall form. Keep your current movement pattern.".to_string());
    } else if overall >= 70 {
        comments.push(
            "Your base form is stable. A few small corrections will take it further.".to_string(),
        );
    } else {
        comments
            .push("Work through the key corrections below slowly and deliberately.".to_string());
    }

    if breakdown.depth < TIP_THRESHOLD {
        comments.push(
            "Squat depth is shallow. Push your hips further back while keeping your knees \
             tracking over your toes."
                .to_string(),
        );
    }
    if breakdown.knee_valgus < TIP_THRESHOLD {
        comments.push(
            "Your knees tend to collapse inward. Keep your foot arch engaged and drive each \
             knee toward its second toe."
                .to_string(),
        );
    }
    if breakdown.back_angle < TIP_THRESHOLD {
        comments.push(
            "Your back alignment breaks down under load. Brace your core first and keep your \
             ribcage stacked over your pelvis."
                .to_string(),
        );
    }
    if breakdown.balance < TIP_THRESHOLD {
        comments.push(
            "Your center of mass is drifting. Ground through heel, little toe, and big toe to \
             hold a stable tripod."
                .to_string(),
        );
    }

    comments
}
