// src/strategy/hand_aware.rs
//
// Joint and tilt angles scored through a step table, blended with an
// agreement term on the detected hands.
use super::{settle, PoseStrategy, ScoreOptions};
use crate::error::{ensure_finite, Result, ScoringError};
use crate::geometry::{angle3, angle_difference, angle_to_horizontal};
use crate::keypoint::{labels, FrameSize, HandPrediction, KeypointIndex, Pose, MIN_CONFIDENCE};
use nalgebra::Vector2;

pub const NAME: &str = "hand-aware-angle";

pub const DEFAULT_HAND_WEIGHT: f64 = 0.1;

/// Hand score used when either side carries no hand data.
pub const NEUTRAL_HAND_SCORE: f64 = 50.0;

/// `(upper bound in degrees, score)`; the first bound above the difference wins.
pub const ANGLE_SCORE_STEPS: [(f64, f64); 5] = [
    (15.0, 1.0),
    (30.0, 0.8),
    (45.0, 0.6),
    (60.0, 0.3),
    (75.0, 0.1),
];

const HAND_POSITION_POINTS: f64 = 50.0;
const HAND_LABEL_POINTS: f64 = 50.0;

/// Step lookup from an angle difference to a score in `[0, 1]`.
pub fn discrete_angle_score(difference_degrees: f64) -> f64 {
    ANGLE_SCORE_STEPS
        .iter()
        .find(|(limit, _)| difference_degrees < *limit)
        .map_or(0.0, |(_, score)| *score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandAwareAngle {
    LeftWristElbowShoulder,
    RightWristElbowShoulder,
    LeftElbowShoulderHip,
    RightElbowShoulderHip,
    HeadTilt,
    ShoulderTilt,
    LeftShoulderHipTilt,
    RightShoulderHipTilt,
}

impl HandAwareAngle {
    pub const ALL: [HandAwareAngle; 8] = [
        HandAwareAngle::LeftWristElbowShoulder,
        HandAwareAngle::RightWristElbowShoulder,
        HandAwareAngle::LeftElbowShoulderHip,
        HandAwareAngle::RightElbowShoulderHip,
        HandAwareAngle::HeadTilt,
        HandAwareAngle::ShoulderTilt,
        HandAwareAngle::LeftShoulderHipTilt,
        HandAwareAngle::RightShoulderHipTilt,
    ];

    // Elbow-shoulder-hip is 0.05 per side. An older description of this
    // table gave it 0.2 per side; 0.05 is what scores are built on.
    pub fn weight(self) -> f64 {
        match self {
            HandAwareAngle::LeftWristElbowShoulder | HandAwareAngle::RightWristElbowShoulder => 0.2,
            HandAwareAngle::LeftElbowShoulderHip | HandAwareAngle::RightElbowShoulderHip => 0.05,
            HandAwareAngle::HeadTilt | HandAwareAngle::ShoulderTilt => 0.1,
            HandAwareAngle::LeftShoulderHipTilt | HandAwareAngle::RightShoulderHipTilt => 0.05,
        }
    }

    fn measure(self, pose: &KeypointIndex) -> Option<f64> {
        let at = |label: &str| pose.get(label);
        match self {
            HandAwareAngle::LeftWristElbowShoulder => angle3(
                at(labels::LEFT_WRIST),
                at(labels::LEFT_ELBOW),
                at(labels::LEFT_SHOULDER),
            ),
            HandAwareAngle::RightWristElbowShoulder => angle3(
                at(labels::RIGHT_WRIST),
                at(labels::RIGHT_ELBOW),
                at(labels::RIGHT_SHOULDER),
            ),
            HandAwareAngle::LeftElbowShoulderHip => angle3(
                at(labels::LEFT_ELBOW),
                at(labels::LEFT_SHOULDER),
                at(labels::LEFT_HIP),
            ),
            HandAwareAngle::RightElbowShoulderHip => angle3(
                at(labels::RIGHT_ELBOW),
                at(labels::RIGHT_SHOULDER),
                at(labels::RIGHT_HIP),
            ),
            HandAwareAngle::HeadTilt => {
                angle_to_horizontal(at(labels::LEFT_EYE), at(labels::RIGHT_EYE))
            }
            HandAwareAngle::ShoulderTilt => {
                angle_to_horizontal(at(labels::LEFT_SHOULDER), at(labels::RIGHT_SHOULDER))
            }
            HandAwareAngle::LeftShoulderHipTilt => {
                angle_to_horizontal(at(labels::LEFT_SHOULDER), at(labels::LEFT_HIP))
            }
            HandAwareAngle::RightShoulderHipTilt => {
                angle_to_horizontal(at(labels::RIGHT_SHOULDER), at(labels::RIGHT_HIP))
            }
        }
    }
}

/// Weighted step-table score over the angles visible on both sides, 0-100.
pub fn angle_similarity(player: &KeypointIndex, target: &KeypointIndex) -> f64 {
    let mut score = 0.0;
    let mut contributing_weight = 0.0;

    for angle in HandAwareAngle::ALL {
        let (Some(p), Some(t)) = (angle.measure(player), angle.measure(target)) else {
            continue;
        };
        let difference = angle_difference(p, t).to_degrees();
        score += discrete_angle_score(difference) * angle.weight();
        contributing_weight += angle.weight();
    }

    if contributing_weight == 0.0 {
        return 0.0;
    }
    score / contributing_weight * 100.0
}

/// Agreement between the two hand sets, 0-100.
pub fn hand_similarity(player: &Pose, target: &Pose) -> f64 {
    let (Some(player_hands), Some(target_hands)) = (&player.hands, &target.hands) else {
        return NEUTRAL_HAND_SCORE;
    };

    match (player_hands.is_empty(), target_hands.is_empty()) {
        (true, true) => return 100.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let player_frame = player.frame_size();
    let target_frame = target.frame_size();

    let total: f64 = target_hands
        .iter()
        .map(|target_hand| {
            player_hands
                .iter()
                .map(|player_hand| {
                    hand_match_score(player_hand, player_frame, target_hand, target_frame)
                })
                .fold(0.0, f64::max)
        })
        .sum();

    total / target_hands.len() as f64
}

fn hand_match_score(
    player: &HandPrediction,
    player_frame: FrameSize,
    target: &HandPrediction,
    target_frame: FrameSize,
) -> f64 {
    let offset = frame_position(player, player_frame) - frame_position(target, target_frame);
    let position = HAND_POSITION_POINTS * (1.0 - offset.norm()).max(0.0);
    let label = if player.label == target.label {
        HAND_LABEL_POINTS
    } else {
        0.0
    };
    position + label
}

fn frame_position(hand: &HandPrediction, frame: FrameSize) -> Vector2<f64> {
    Vector2::new(hand.x / frame.width, hand.y / frame.height)
}

#[derive(Debug, Clone)]
pub struct HandAwareStrategy {
    min_confidence: f64,
}

impl Default for HandAwareStrategy {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE)
    }
}

impl HandAwareStrategy {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Angle similarity of the two poses after dropping `excluded` labels.
    pub fn angle_similarity(&self, player: &Pose, target: &Pose, excluded: &[String]) -> Result<f64> {
        if player.keypoints.is_empty() || target.keypoints.is_empty() {
            return Err(ScoringError::EmptyPose);
        }
        let player = KeypointIndex::from_keypoints(&player.keypoints, self.min_confidence).without(excluded);
        let target = KeypointIndex::from_keypoints(&target.keypoints, self.min_confidence).without(excluded);
        if player.is_empty() || target.is_empty() {
            return Err(ScoringError::EmptyPose);
        }
        ensure_finite(angle_similarity(&player, &target), "hand-aware angle similarity")
    }

    /// Full comparison with an explicit hand weight and exclusion list.
    pub fn calculate_similarity(
        &self,
        player: &Pose,
        target: &Pose,
        hand_weight: f64,
        excluded: &[String],
    ) -> u8 {
        let hand_weight = hand_weight.clamp(0.0, 1.0);
        let result = self.angle_similarity(player, target, excluded).map(|angles| {
            angles * (1.0 - hand_weight) + hand_similarity(player, target) * hand_weight
        });
        settle(NAME, result)
    }

    /// Entry point for callers without hand data: the hand term is neutral.
    pub fn score_keypoints(&self, player: &Pose, target: &Pose) -> u8 {
        let result = self.angle_similarity(player, target, &[]).map(|angles| {
            angles * (1.0 - DEFAULT_HAND_WEIGHT) + NEUTRAL_HAND_SCORE * DEFAULT_HAND_WEIGHT
        });
        settle(NAME, result)
    }
}

impl PoseStrategy for HandAwareStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, options: &ScoreOptions) -> u8 {
        self.calculate_similarity(player, target, options.hand_weight, &options.excluded_labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    fn pose(hands: Option<Vec<HandPrediction>>) -> Pose {
        Pose {
            keypoints: samples::TARGET.clone(),
            hands,
            frame: None,
        }
    }

    #[test]
    fn step_table_thresholds() {
        assert_eq!(discrete_angle_score(0.0), 1.0);
        assert_eq!(discrete_angle_score(14.999), 1.0);
        assert_eq!(discrete_angle_score(15.0), 0.8);
        assert_eq!(discrete_angle_score(29.9), 0.8);
        assert_eq!(discrete_angle_score(30.0), 0.6);
        assert_eq!(discrete_angle_score(45.0), 0.3);
        assert_eq!(discrete_angle_score(60.0), 0.1);
        assert_eq!(discrete_angle_score(75.0), 0.0);
        assert_eq!(discrete_angle_score(180.0), 0.0);
        assert_eq!(discrete_angle_score(f64::NAN), 0.0);
    }

    #[test]
    fn step_table_never_rewards_larger_differences() {
        assert!(discrete_angle_score(10.0) >= discrete_angle_score(40.0));
        let mut previous = f64::INFINITY;
        for degrees in 0..=180 {
            let score = discrete_angle_score(degrees as f64);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn elbow_shoulder_hip_weight_stays_at_implemented_value() {
        // Known discrepancy: an older description gave this pair 0.2 each.
        assert_eq!(HandAwareAngle::LeftElbowShoulderHip.weight(), 0.05);
        assert_eq!(HandAwareAngle::RightElbowShoulderHip.weight(), 0.05);
        let total: f64 = HandAwareAngle::ALL.iter().map(|a| a.weight()).sum();
        assert!((total - 0.8).abs() < 1e-12);
    }

    #[test]
    fn hand_similarity_without_data_is_neutral() {
        assert_eq!(hand_similarity(&pose(None), &pose(Some(vec![]))), NEUTRAL_HAND_SCORE);
        assert_eq!(hand_similarity(&pose(None), &pose(None)), NEUTRAL_HAND_SCORE);
    }

    #[test]
    fn hand_similarity_agreement_on_absence() {
        assert_eq!(hand_similarity(&pose(Some(vec![])), &pose(Some(vec![]))), 100.0);
    }

    #[test]
    fn hand_similarity_one_sided_is_zero() {
        let hands = vec![HandPrediction::new("left", 100.0, 100.0)];
        assert_eq!(hand_similarity(&pose(Some(hands.clone())), &pose(Some(vec![]))), 0.0);
        assert_eq!(hand_similarity(&pose(Some(vec![])), &pose(Some(hands))), 0.0);
    }

    #[test]
    fn hand_similarity_matches_closest_hand() {
        let target = vec![
            HandPrediction::new("left", 320.0, 240.0),
            HandPrediction::new("right", 0.0, 0.0),
        ];
        let player = vec![
            HandPrediction::new("right", 0.0, 0.0),
            HandPrediction::new("left", 320.0, 240.0),
        ];
        assert_eq!(hand_similarity(&pose(Some(player)), &pose(Some(target))), 100.0);

        // Same spot, wrong label: position points only
        let target = vec![HandPrediction::new("left", 320.0, 240.0)];
        let player = vec![HandPrediction::new("right", 320.0, 240.0)];
        assert_eq!(hand_similarity(&pose(Some(player)), &pose(Some(target))), 50.0);
    }

    #[test]
    fn hand_positions_are_measured_relative_to_the_frame() {
        let target = vec![HandPrediction::new("open", 320.0, 240.0)];
        let player = vec![HandPrediction::new("open", 384.0, 240.0)];

        // 64px on a 640px wide frame
        let default_frame = hand_similarity(&pose(Some(player.clone())), &pose(Some(target.clone())));
        assert!((default_frame - 95.0).abs() < 1e-9);

        let wide = FrameSize {
            width: 1280.0,
            height: 480.0,
        };
        let wide_frame = hand_similarity(
            &pose(Some(player)).with_frame(wide),
            &pose(Some(target)).with_frame(wide),
        );
        assert!((wide_frame - 97.5).abs() < 1e-9);
    }

    #[test]
    fn target_hand_takes_best_scoring_player_hand() {
        // The nearest player hand has the wrong label; the labelled one
        // slightly further away wins.
        let target = vec![HandPrediction::new("open", 0.0, 0.0)];
        let player = vec![
            HandPrediction::new("closed", 0.0, 0.0),
            HandPrediction::new("open", 64.0, 0.0),
        ];
        let score = hand_similarity(&pose(Some(player)), &pose(Some(target)));
        assert!((score - 95.0).abs() < 1e-9);
    }

    #[test]
    fn identical_pose_with_agreeing_hands_scores_100() {
        let strategy = HandAwareStrategy::default();
        let a = pose(Some(vec![]));
        assert_eq!(strategy.calculate_similarity(&a, &a, DEFAULT_HAND_WEIGHT, &[]), 100);
    }

    #[test]
    fn legacy_entry_point_uses_neutral_hands() {
        let strategy = HandAwareStrategy::default();
        let a = pose(None);
        // 100 * 0.9 + 50 * 0.1
        assert_eq!(strategy.score_keypoints(&a, &a), 95);
    }

    #[test]
    fn empty_or_faint_input_scores_zero() {
        let strategy = HandAwareStrategy::default();
        let empty = Pose::default().with_hands(vec![]);
        assert_eq!(strategy.calculate_similarity(&empty, &pose(Some(vec![])), 0.1, &[]), 0);
        assert_eq!(strategy.score_keypoints(&Pose::default(), &pose(None)), 0);
    }
}
