//! Timestamp planner
//!
//! Given a video duration, produces the fixed ordered sequence of sample
//! instants the frame sampler works through: one near the start, one at the
//! midpoint, and `tail_count` instants spread through the back half, where
//! exercise-form degradation is most diagnostic. Pure and deterministic, so
//! test fixtures are reproducible.

use crate::types::{PlanError, SampleInstant};

/// Default number of tail instants per plan
pub const DEFAULT_TAIL_COUNT: usize = 10;

/// Durations below this collapse to a single-instant plan
///
/// For sub-second clips the midpoint and near-end instants collapse against
/// the start instant; rather than emitting degenerate or duplicate
/// timestamps, the plan shrinks to one midpoint sample.
pub const MIN_FULL_PLAN_DURATION: f64 = 1.0;

/// Plan the sample instants for a video of `duration` seconds
///
/// Returns `tail_count + 2` instants labeled `start`, `middle`,
/// `tail_01..tail_NN`, all within `[0, duration]`, with the tail block
/// strictly increasing between the midpoint and the near-end instant.
///
/// # Errors
/// `PlanError::InvalidDuration` if `duration` is not finite and positive.
pub fn plan_timestamps(
    duration: f64,
    tail_count: usize,
) -> Result<Vec<SampleInstant>, PlanError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PlanError::InvalidDuration(duration));
    }

    if duration < MIN_FULL_PLAN_DURATION {
        return Ok(vec![SampleInstant {
            label: "middle".to_string(),
            t: duration / 2.0,
        }]);
    }

    // Near-beginning instant, bounded away from 0 to avoid decoder edge
    // artifacts and capped at 0.5s for long videos.
    let start = (duration * 0.01).clamp(0.1, 0.5);
    let mid = duration / 2.0;
    // Pulled back 50ms to avoid decoding past EOF.
    let end = (duration - 0.05).max(0.05);

    let mut plan = Vec::with_capacity(tail_count + 2);
    plan.push(SampleInstant {
        label: "start".to_string(),
        t: start,
    });
    plan.push(SampleInstant {
        label: "middle".to_string(),
        t: mid,
    });
    for i in 1..=tail_count {
        let ratio = i as f64 / (tail_count + 1) as f64;
        plan.push(SampleInstant {
            label: format!("tail_{:02}", i),
            t: mid + ratio * (end - mid),
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_has_tail_count_plus_two_instants() {
        for duration in [1.0, 5.0, 20.0, 600.0, 7200.0] {
            for tail_count in [0, 1, 3, 10] {
                let plan = plan_timestamps(duration, tail_count).unwrap();
                assert_eq!(plan.len(), tail_count + 2, "duration={}", duration);
                for instant in &plan {
                    assert!(instant.t >= 0.0 && instant.t <= duration);
                }
            }
        }
    }

    #[test]
    fn tail_block_is_strictly_increasing() {
        let plan = plan_timestamps(300.0, 10).unwrap();
        let tails: Vec<f64> = plan[2..].iter().map(|i| i.t).collect();
        for pair in tails.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // Tails are strictly between the midpoint and the near-end instant.
        assert!(tails[0] > 150.0);
        assert!(*tails.last().unwrap() < 299.95);
    }

    #[test]
    fn labels_are_zero_padded_and_unique() {
        let plan = plan_timestamps(60.0, 10).unwrap();
        assert_eq!(plan[0].label, "start");
        assert_eq!(plan[1].label, "middle");
        assert_eq!(plan[2].label, "tail_01");
        assert_eq!(plan[11].label, "tail_10");

        let mut labels: Vec<&str> = plan.iter().map(|i| i.label.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), plan.len());
    }

    #[test]
    fn twenty_second_video_with_three_tails() {
        let plan = plan_timestamps(20.0, 3).unwrap();
        assert_eq!(plan.len(), 5);

        // start = clamp(0.2, 0.1, 0.5), mid = 10, end = 19.95
        assert!((plan[0].t - 0.2).abs() < 1e-9);
        assert!((plan[1].t - 10.0).abs() < 1e-9);
        let span = 19.95 - 10.0;
        assert!((plan[2].t - (10.0 + span * 0.25)).abs() < 1e-9);
        assert!((plan[3].t - (10.0 + span * 0.50)).abs() < 1e-9);
        assert!((plan[4].t - (10.0 + span * 0.75)).abs() < 1e-9);
    }

    #[test]
    fn start_instant_bounds() {
        // Short video: 1% of 2s = 0.02, floored at 0.1
        assert!((plan_timestamps(2.0, 1).unwrap()[0].t - 0.1).abs() < 1e-9);
        // Long video: 1% of 600s = 6, capped at 0.5
        assert!((plan_timestamps(600.0, 1).unwrap()[0].t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sub_second_duration_collapses_to_single_instant() {
        let plan = plan_timestamps(0.6, 10).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].label, "middle");
        assert!((plan[0].t - 0.3).abs() < 1e-9);
    }

    #[test]
    fn invalid_durations_are_rejected() {
        assert_eq!(
            plan_timestamps(0.0, 10),
            Err(PlanError::InvalidDuration(0.0))
        );
        assert_eq!(
            plan_timestamps(-3.0, 10),
            Err(PlanError::InvalidDuration(-3.0))
        );
        assert!(plan_timestamps(f64::NAN, 10).is_err());
        assert!(plan_timestamps(f64::INFINITY, 10).is_err());
    }
}
