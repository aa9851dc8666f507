// src/strategy/enhanced_angle.rs
//
// Angle+position comparison in a body-normalized frame. Arm angles carry
// most of the weight; positions only refine the result.
use super::{index_pair, settle, PoseStrategy, ScoreOptions};
use crate::error::{ensure_finite, Result};
use crate::geometry::{angle3, angle_difference, angle_to_horizontal, distance};
use crate::keypoint::{labels, KeypointIndex, Pose, MIN_CONFIDENCE};
use crate::normalize::normalize_to_body;
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const NAME: &str = "enhanced-angle";

/// Exponent on the normalized angle difference; below 1 punishes small
/// differences hard.
pub const ANGLE_PENALTY_EXPONENT: f64 = 0.7;

const ANGLE_SHARE: f64 = 0.8;
const POSITION_SHARE: f64 = 0.2;

// Normalized distance that maps to a position score of 0
const MAX_NORMALIZED_DISTANCE: f64 = 1.0;

const SELECTED_KEYPOINTS: [&str; 12] = [
    labels::NOSE,
    labels::LEFT_SHOULDER,
    labels::RIGHT_SHOULDER,
    labels::LEFT_ELBOW,
    labels::RIGHT_ELBOW,
    labels::LEFT_WRIST,
    labels::RIGHT_WRIST,
    labels::LEFT_KNEE,
    labels::RIGHT_KNEE,
    labels::LEFT_ANKLE,
    labels::RIGHT_ANKLE,
    labels::CENTER_HIP,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoseAngle {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    ShoulderTilt,
    BodyTilt,
}

impl PoseAngle {
    pub const ALL: [PoseAngle; 6] = [
        PoseAngle::LeftArm,
        PoseAngle::RightArm,
        PoseAngle::LeftLeg,
        PoseAngle::RightLeg,
        PoseAngle::ShoulderTilt,
        PoseAngle::BodyTilt,
    ];

    pub fn weight(self) -> f64 {
        match self {
            PoseAngle::LeftArm | PoseAngle::RightArm => 5.0,
            PoseAngle::LeftLeg | PoseAngle::RightLeg => 1.0,
            PoseAngle::ShoulderTilt => 3.0,
            PoseAngle::BodyTilt => 2.0,
        }
    }

    fn measure(self, pose: &KeypointIndex) -> Option<f64> {
        let at = |label: &str| pose.get(label);
        match self {
            PoseAngle::LeftArm => angle3(
                at(labels::LEFT_SHOULDER),
                at(labels::LEFT_ELBOW),
                at(labels::LEFT_WRIST),
            ),
            PoseAngle::RightArm => angle3(
                at(labels::RIGHT_SHOULDER),
                at(labels::RIGHT_ELBOW),
                at(labels::RIGHT_WRIST),
            ),
            PoseAngle::LeftLeg => angle3(
                at(labels::CENTER_HIP),
                at(labels::LEFT_KNEE),
                at(labels::LEFT_ANKLE),
            ),
            PoseAngle::RightLeg => angle3(
                at(labels::CENTER_HIP),
                at(labels::RIGHT_KNEE),
                at(labels::RIGHT_ANKLE),
            ),
            PoseAngle::ShoulderTilt => {
                angle_to_horizontal(at(labels::LEFT_SHOULDER), at(labels::RIGHT_SHOULDER))
            }
            PoseAngle::BodyTilt => angle_to_horizontal(at(labels::NOSE), at(labels::CENTER_HIP)),
        }
    }
}

/// Angles (radians) measured on a normalized pose; absent when a source
/// point is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseAngleSet {
    angles: BTreeMap<PoseAngle, f64>,
}

impl PoseAngleSet {
    pub fn extract(pose: &KeypointIndex) -> Self {
        let angles = PoseAngle::ALL
            .iter()
            .filter_map(|&angle| angle.measure(pose).map(|value| (angle, value)))
            .collect();
        Self { angles }
    }

    pub fn get(&self, angle: PoseAngle) -> Option<f64> {
        self.angles.get(&angle).copied()
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

/// Confidence-weighted mean distance between matching normalized points,
/// mapped onto 0-100. No shared points scores 0.
pub fn position_similarity(player: &KeypointIndex, target: &KeypointIndex) -> f64 {
    let mut total_distance = 0.0;
    let mut total_weight = 0.0;

    for label in SELECTED_KEYPOINTS {
        let (Some(p), Some(t)) = (player.get(label), target.get(label)) else {
            continue;
        };
        let weight = p.confidence.min(t.confidence);
        total_distance += distance(Some(p), Some(t)).unwrap_or(0.0) * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return 0.0;
    }

    let average = total_distance / total_weight;
    (100.0 - (average / MAX_NORMALIZED_DISTANCE) * 100.0).max(0.0)
}

/// Weighted mean angular difference, penalized with
/// [`ANGLE_PENALTY_EXPONENT`] and mapped onto 0-100.
pub fn angle_similarity(player: &PoseAngleSet, target: &PoseAngleSet) -> f64 {
    let mut weighted_difference = 0.0;
    let mut total_weight = 0.0;

    for angle in PoseAngle::ALL {
        if let (Some(p), Some(t)) = (player.get(angle), target.get(angle)) {
            weighted_difference += angle_difference(p, t) * angle.weight();
            total_weight += angle.weight();
        }
    }

    if total_weight == 0.0 {
        return 0.0;
    }

    let normalized_difference = weighted_difference / total_weight / PI;
    if normalized_difference.is_nan() || normalized_difference < 0.0 {
        return 0.0;
    }

    let penalty = normalized_difference.powf(ANGLE_PENALTY_EXPONENT);
    (100.0 - penalty * 100.0).max(0.0)
}

#[derive(Debug, Clone)]
pub struct EnhancedAngleStrategy {
    min_confidence: f64,
}

impl Default for EnhancedAngleStrategy {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE)
    }
}

impl EnhancedAngleStrategy {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub(crate) fn compare(&self, player: &Pose, target: &Pose) -> Result<f64> {
        let (player, target) = index_pair(player, target, self.min_confidence)?;

        let player = normalize_to_body(&player);
        let target = normalize_to_body(&target);

        let position = ensure_finite(position_similarity(&player, &target), "position similarity")?;
        let angle = ensure_finite(
            angle_similarity(&PoseAngleSet::extract(&player), &PoseAngleSet::extract(&target)),
            "angle similarity",
        )?;

        Ok(angle * ANGLE_SHARE + position * POSITION_SHARE)
    }
}

impl PoseStrategy for EnhancedAngleStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, _options: &ScoreOptions) -> u8 {
        settle(NAME, self.compare(player, target))
    }
}
