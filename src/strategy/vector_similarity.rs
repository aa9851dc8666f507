// src/strategy/vector_similarity.rs
//
// Scale-invariant feature vector comparison. Angles are divided by π and
// lengths by the shoulder width, so every slot lives roughly in [0, 2].
use super::{index_pair, settle, PoseStrategy, ScoreOptions};
use crate::error::{ensure_finite, Result};
use crate::geometry::{angle3, angle_to_horizontal, distance, limb_length, min_max_ratio};
use crate::keypoint::{labels, KeypointIndex, Pose, MIN_CONFIDENCE};
use std::f64::consts::PI;

pub const NAME: &str = "vector-similarity";

pub const FEATURE_COUNT: usize = 15;

/// Exponent applied to each per-feature difference; above 1 lets large
/// deviations dominate.
pub const FEATURE_PENALTY_EXPONENT: f64 = 1.5;

/// Largest weighted difference considered meaningful.
pub const MAX_FEATURE_DIFFERENCE: f64 = 2.0;

/// Scale used when the shoulders are not both visible.
const FALLBACK_SCALE: f64 = 100.0;

/// Same order as [`PoseFeatures::extract`].
pub const FEATURE_WEIGHTS: [f64; FEATURE_COUNT] = [
    5.0, 5.0, // arm angles
    1.5, 1.5, // leg angles
    2.0, 2.0, 2.0, 2.0, 2.0, // limb and torso lengths
    1.0, // hip / shoulder width
    2.0, 2.0, // left/right symmetry
    3.0, // shoulder tilt
    1.0, 1.0, // head offset
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFeatures(pub [f64; FEATURE_COUNT]);

impl PoseFeatures {
    /// Builds the fixed-order vector. A slot whose source points are
    /// missing is filled with 0 rather than dropped.
    pub fn extract(pose: &KeypointIndex) -> Self {
        let at = |label: &str| pose.get(label);

        let left_shoulder = at(labels::LEFT_SHOULDER);
        let right_shoulder = at(labels::RIGHT_SHOULDER);
        let shoulder_width = distance(left_shoulder, right_shoulder);
        let scale = shoulder_width.filter(|w| *w > 0.0).unwrap_or(FALLBACK_SCALE);

        let shoulder_center = pose.shoulder_center();
        let hip_center = pose.center_hip();

        let left_arm = limb_length(left_shoulder, at(labels::LEFT_ELBOW), at(labels::LEFT_WRIST));
        let right_arm = limb_length(right_shoulder, at(labels::RIGHT_ELBOW), at(labels::RIGHT_WRIST));
        let left_leg = limb_length(at(labels::LEFT_HIP), at(labels::LEFT_KNEE), at(labels::LEFT_ANKLE));
        let right_leg = limb_length(at(labels::RIGHT_HIP), at(labels::RIGHT_KNEE), at(labels::RIGHT_ANKLE));
        let torso = distance(shoulder_center.as_ref(), hip_center.as_ref());
        let hip_width = distance(at(labels::LEFT_HIP), at(labels::RIGHT_HIP));

        let head_offset = match (at(labels::NOSE), shoulder_center.as_ref()) {
            (Some(nose), Some(center)) => Some(nose.position() - center.position()),
            _ => None,
        };

        let angle = |value: Option<f64>| value.map_or(0.0, |a| a / PI);
        let length = |value: Option<f64>| value.map_or(0.0, |l| l / scale);
        let symmetry = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => min_max_ratio(a, b),
            _ => 0.0,
        };

        Self([
            angle(angle3(left_shoulder, at(labels::LEFT_ELBOW), at(labels::LEFT_WRIST))),
            angle(angle3(right_shoulder, at(labels::RIGHT_ELBOW), at(labels::RIGHT_WRIST))),
            angle(angle3(at(labels::LEFT_HIP), at(labels::LEFT_KNEE), at(labels::LEFT_ANKLE))),
            angle(angle3(at(labels::RIGHT_HIP), at(labels::RIGHT_KNEE), at(labels::RIGHT_ANKLE))),
            length(left_arm),
            length(right_arm),
            length(left_leg),
            length(right_leg),
            length(torso),
            match (hip_width, shoulder_width) {
                (Some(hips), Some(shoulders)) if shoulders > 0.0 => hips / shoulders,
                _ => 0.0,
            },
            symmetry(left_arm, right_arm),
            symmetry(left_leg, right_leg),
            angle(angle_to_horizontal(left_shoulder, right_shoulder)),
            length(head_offset.map(|offset| offset.x)),
            length(head_offset.map(|offset| offset.y)),
        ])
    }

    /// Weighted mean of `|Δ|^1.5` over all slots, mapped onto 0-100.
    pub fn similarity(&self, other: &Self) -> f64 {
        let (weighted, total_weight) = self
            .0
            .iter()
            .zip(other.0.iter())
            .zip(FEATURE_WEIGHTS.iter())
            .fold((0.0, 0.0), |(sum, weights), ((a, b), w)| {
                (sum + (a - b).abs().powf(FEATURE_PENALTY_EXPONENT) * w, weights + w)
            });

        let normalized = weighted / total_weight / MAX_FEATURE_DIFFERENCE;
        (100.0 - normalized * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct VectorSimilarityStrategy {
    min_confidence: f64,
}

impl Default for VectorSimilarityStrategy {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE)
    }
}

impl VectorSimilarityStrategy {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub(crate) fn compare(&self, player: &Pose, target: &Pose) -> Result<f64> {
        let (player, target) = index_pair(player, target, self.min_confidence)?;
        let player = PoseFeatures::extract(&player);
        let target = PoseFeatures::extract(&target);
        ensure_finite(player.similarity(&target), "feature similarity")
    }
}

impl PoseStrategy for VectorSimilarityStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, _options: &ScoreOptions) -> u8 {
        settle(NAME, self.compare(player, target))
    }
}
