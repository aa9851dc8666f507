// src/strategy/aligned_distance.rs
use super::{index_pair, settle, PoseStrategy, ScoreOptions};
use crate::error::{ensure_finite, Result};
use crate::geometry::distance;
use crate::keypoint::{labels, Pose, MIN_CONFIDENCE};
use crate::normalize::translate_to_reference;

pub const NAME: &str = "aligned-distance";

/// Pixel distance that maps to a score of 0. Poses are only translated,
/// so this comparison is sensitive to body size.
pub const MAX_PIXEL_DISTANCE: f64 = 200.0;

const IMPORTANCE: [(&str, f64); 13] = [
    (labels::NOSE, 2.0),
    (labels::LEFT_SHOULDER, 3.0),
    (labels::RIGHT_SHOULDER, 3.0),
    (labels::LEFT_ELBOW, 4.0),
    (labels::RIGHT_ELBOW, 4.0),
    (labels::LEFT_WRIST, 5.0),
    (labels::RIGHT_WRIST, 5.0),
    (labels::LEFT_HIP, 2.0),
    (labels::RIGHT_HIP, 2.0),
    (labels::LEFT_KNEE, 1.5),
    (labels::RIGHT_KNEE, 1.5),
    (labels::LEFT_ANKLE, 1.0),
    (labels::RIGHT_ANKLE, 1.0),
];

pub fn importance(label: &str) -> Option<f64> {
    IMPORTANCE
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, weight)| *weight)
}

#[derive(Debug, Clone)]
pub struct AlignedDistanceStrategy {
    min_confidence: f64,
}

impl Default for AlignedDistanceStrategy {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE)
    }
}

impl AlignedDistanceStrategy {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub(crate) fn compare(&self, player: &Pose, target: &Pose) -> Result<f64> {
        let (player, target) = index_pair(player, target, self.min_confidence)?;
        let player = translate_to_reference(&player);
        let target = translate_to_reference(&target);

        let mut total_distance = 0.0;
        let mut total_weight = 0.0;
        for (label, importance) in IMPORTANCE {
            let (Some(p), Some(t)) = (player.get(label), target.get(label)) else {
                continue;
            };
            let weight = importance * p.confidence.min(t.confidence);
            total_distance += distance(Some(p), Some(t)).unwrap_or(0.0) * weight;
            total_weight += weight;
        }

        if total_weight == 0.0 {
            return Ok(0.0);
        }

        let average = ensure_finite(total_distance / total_weight, "aligned distance")?;
        Ok((100.0 - (average / MAX_PIXEL_DISTANCE) * 100.0).max(0.0))
    }
}

impl PoseStrategy for AlignedDistanceStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, _options: &ScoreOptions) -> u8 {
        settle(NAME, self.compare(player, target))
    }
}
