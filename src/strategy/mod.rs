// src/strategy/mod.rs
use crate::error::{Result, ScoringError};
use crate::keypoint::{KeypointIndex, Pose};
use tracing::{debug, error};

pub mod aligned_distance;
pub mod enhanced_angle;
pub mod hand_aware;
pub mod hybrid;
pub mod simple_distance;
pub mod vector_similarity;

pub use aligned_distance::AlignedDistanceStrategy;
pub use enhanced_angle::EnhancedAngleStrategy;
pub use hand_aware::HandAwareStrategy;
pub use hybrid::{HybridStrategy, HybridWeights};
pub use simple_distance::SimpleDistanceStrategy;
pub use vector_similarity::VectorSimilarityStrategy;

/// Per-call knobs. Only the hand-aware strategy reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOptions {
    pub hand_weight: f64,
    pub excluded_labels: Vec<String>,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            hand_weight: hand_aware::DEFAULT_HAND_WEIGHT,
            excluded_labels: Vec::new(),
        }
    }
}

/// One way of turning a player pose and a target pose into a 0-100 score.
///
/// Implementations never fail: missing or malformed data degrades to a
/// partial comparison or a score of 0.
pub trait PoseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, player: &Pose, target: &Pose, options: &ScoreOptions) -> u8;
}

/// Rounds and clamps a raw similarity into the public score range.
pub(crate) fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Outer boundary shared by all strategies: errors are logged, never raised.
pub(crate) fn settle(strategy: &str, result: Result<f64>) -> u8 {
    match result {
        Ok(value) => to_score(value),
        Err(ScoringError::EmptyPose) => {
            debug!(strategy, "nothing to compare, scoring 0");
            0
        }
        Err(err) => {
            error!(strategy, %err, "error calculating pose similarity");
            0
        }
    }
}

/// Indexes both poses, refusing to go on when either side has nothing left.
pub(crate) fn index_pair(
    player: &Pose,
    target: &Pose,
    min_confidence: f64,
) -> Result<(KeypointIndex, KeypointIndex)> {
    if player.keypoints.is_empty() || target.keypoints.is_empty() {
        return Err(ScoringError::EmptyPose);
    }
    let player = KeypointIndex::from_keypoints(&player.keypoints, min_confidence);
    let target = KeypointIndex::from_keypoints(&target.keypoints, min_confidence);
    if player.is_empty() || target.is_empty() {
        return Err(ScoringError::EmptyPose);
    }
    Ok((player, target))
}
