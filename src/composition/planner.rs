use tracing::{debug, info};

use crate::{
    config::TimingConfig,
    error::{AssetError, Result, TimingError},
};

/// Segment timing for one job
///
/// Satisfies `target = n * segment - (n - 1) * overlap` and
/// `segment > overlap >= 0`. Single-image plans carry no overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    pub target_total_duration: f64,
    pub segment_duration: f64,
    pub transition_overlap: f64,
    pub asset_count: usize,
}

impl RenderPlan {
    /// Number of crossfades joining the segments
    pub fn transition_count(&self) -> usize {
        self.asset_count.saturating_sub(1)
    }

    pub fn has_transitions(&self) -> bool {
        self.transition_count() > 0
    }

    /// Start of the `index`-th crossfade (1-based)
    pub fn transition_offset(&self, index: usize) -> f64 {
        index as f64 * (self.segment_duration - self.transition_overlap)
    }

    /// Offsets of every crossfade in order
    pub fn transition_offsets(&self) -> Vec<f64> {
        (1..=self.transition_count())
            .map(|i| self.transition_offset(i))
            .collect()
    }

    /// Length produced by chaining the segments, from the plan's own terms
    pub fn composed_duration(&self) -> f64 {
        let n = self.asset_count as f64;
        n * self.segment_duration - (n - 1.0) * self.transition_overlap
    }
}

/// Pure function from narration length and image count to a [`RenderPlan`]
#[derive(Debug, Clone, Copy)]
pub struct DurationPlanner {
    transition: f64,
    end_buffer: f64,
    default_duration: f64,
}

impl DurationPlanner {
    pub fn new(transition: f64, end_buffer: f64, default_duration: f64) -> Self {
        Self {
            transition,
            end_buffer,
            default_duration,
        }
    }

    pub fn from_config(config: &TimingConfig) -> Self {
        Self::new(config.transition_duration, config.end_buffer, config.default_duration)
    }

    /// Total video length for a narration of `narration_duration` seconds
    ///
    /// Zero (or anything not a positive number) means "no narration" and
    /// yields the default duration.
    pub fn target_duration(&self, narration_duration: f64) -> f64 {
        if narration_duration.is_finite() && narration_duration > 0.0 {
            narration_duration + self.end_buffer
        } else {
            self.default_duration
        }
    }

    pub fn plan(&self, narration_duration: f64, asset_count: usize) -> Result<RenderPlan> {
        if asset_count == 0 {
            return Err(AssetError::NoUsableAssets {
                attempted: 0,
                reasons: "no images to plan".to_string(),
            }
            .into());
        }

        let target = self.target_duration(narration_duration);

        let (segment, overlap) = if asset_count == 1 {
            (target, 0.0)
        } else {
            let f = self.transition;
            ((target + (asset_count - 1) as f64 * f) / asset_count as f64, f)
        };

        if !(segment > overlap) {
            return Err(TimingError::Degenerate {
                segment,
                overlap: self.transition,
                asset_count,
                target,
            }
            .into());
        }

        let plan = RenderPlan {
            target_total_duration: target,
            segment_duration: segment,
            transition_overlap: overlap,
            asset_count,
        };

        info!(
            "   Plan: {} images x {:.3}s, {:.2}s crossfades -> {:.2}s",
            asset_count, segment, overlap, target
        );
        debug!("Transition offsets: {:?}", plan.transition_offsets());

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn planner() -> DurationPlanner {
        DurationPlanner::new(0.5, 1.5, 18.0)
    }

    #[test]
    fn test_timing_invariant_holds() {
        let planner = planner();
        for count in 2..=10 {
            for narration in [0.0, 3.7, 8.0, 12.0, 29.9, 57.25] {
                let plan = planner.plan(narration, count).unwrap();
                let target = planner.target_duration(narration);
                let rebuilt = count as f64 * plan.segment_duration
                    - (count - 1) as f64 * 0.5;
                assert!(
                    (rebuilt - target).abs() < 1e-6,
                    "{} images, {}s narration: {} != {}",
                    count, narration, rebuilt, target
                );
                assert!(plan.segment_duration > plan.transition_overlap);
            }
        }
    }

    #[test]
    fn test_scenario_three_images() {
        let plan = planner().plan(12.0, 3).unwrap();

        assert_eq!(plan.target_total_duration, 13.5);
        assert_eq!(plan.segment_duration, (13.5 + 2.0 * 0.5) / 3.0);
        assert!((plan.segment_duration - 4.8333).abs() < 1e-4);

        let offsets = plan.transition_offsets();
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0], 1.0 * (plan.segment_duration - 0.5));
        assert_eq!(offsets[1], 2.0 * (plan.segment_duration - 0.5));
        assert!((offsets[0] - 4.3333).abs() < 1e-4);
        assert!((offsets[1] - 8.6667).abs() < 1e-4);
    }

    #[test]
    fn test_single_image_has_no_transition() {
        let plan = planner().plan(8.0, 1).unwrap();

        assert_eq!(plan.target_total_duration, 9.5);
        assert_eq!(plan.segment_duration, 9.5);
        assert!(!plan.has_transitions());
        assert!(plan.transition_offsets().is_empty());
        assert_eq!(plan.composed_duration(), 9.5);
    }

    #[test]
    fn test_default_duration_without_narration() {
        let plan = planner().plan(0.0, 4).unwrap();
        assert_eq!(plan.target_total_duration, 18.0);
        assert!((plan.composed_duration() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_timing_rejected() {
        // 0.3s target: every segment would be shorter than the fade
        let planner = DurationPlanner::new(0.5, 0.0, 18.0);
        let err = planner.plan(0.3, 3).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DegenerateTiming);
    }

    #[test]
    fn test_zero_assets_rejected() {
        let err = planner().plan(12.0, 0).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoUsableAssets);
    }
}
