// src/strategy/simple_distance.rs
//
// Position-only comparison used when nothing smarter is wanted: keypoints
// are paired by their position in the input lists, not by label.
use super::{settle, PoseStrategy, ScoreOptions};
use crate::error::{Result, ScoringError};
use crate::geometry::distance;
use crate::keypoint::Pose;

pub const NAME: &str = "simple-distance";

/// Both points of a pair must be more confident than this.
pub const PAIR_MIN_CONFIDENCE: f64 = 0.5;

/// Per-pair pixel distance cap; also the distance that scores 0.
pub const MAX_PAIR_DISTANCE: f64 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct SimpleDistanceStrategy;

impl SimpleDistanceStrategy {
    fn compare(&self, player: &Pose, target: &Pose) -> Result<f64> {
        if player.keypoints.is_empty() || target.keypoints.is_empty() {
            return Err(ScoringError::EmptyPose);
        }

        let distances: Vec<f64> = player
            .keypoints
            .iter()
            .zip(target.keypoints.iter())
            .filter(|(p, t)| p.confidence > PAIR_MIN_CONFIDENCE && t.confidence > PAIR_MIN_CONFIDENCE)
            .filter_map(|(p, t)| distance(Some(p), Some(t)))
            .map(|d| d.min(MAX_PAIR_DISTANCE))
            .collect();

        if distances.is_empty() {
            return Ok(0.0);
        }

        let average = distances.iter().sum::<f64>() / distances.len() as f64;
        Ok((100.0 - (average / MAX_PAIR_DISTANCE) * 100.0).max(0.0))
    }
}

impl PoseStrategy for SimpleDistanceStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, _options: &ScoreOptions) -> u8 {
        settle(NAME, self.compare(player, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Keypoint;
    use crate::samples;

    fn score(player: Vec<Keypoint>, target: Vec<Keypoint>) -> u8 {
        SimpleDistanceStrategy.score(&Pose::new(player), &Pose::new(target), &ScoreOptions::default())
    }

    #[test]
    fn identical_poses_score_100() {
        assert_eq!(score(samples::TARGET.clone(), samples::TARGET.clone()), 100);
    }

    #[test]
    fn distances_are_capped() {
        let target = vec![
            Keypoint::new("a", 0.0, 0.0, 0.9),
            Keypoint::new("b", 0.0, 0.0, 0.9),
        ];
        let player = vec![
            Keypoint::new("a", 1000.0, 0.0, 0.9),
            Keypoint::new("b", 0.0, 50.0, 0.9),
        ];
        // (100 + 50) / 2 = 75px
        assert_eq!(score(player, target), 25);
    }

    #[test]
    fn low_confidence_pairs_are_skipped() {
        let target = vec![Keypoint::new("a", 0.0, 0.0, 0.9)];
        let player = vec![Keypoint::new("a", 0.0, 0.0, 0.5)];
        assert_eq!(score(player, target), 0);
        assert_eq!(score(vec![], samples::TARGET.clone()), 0);
    }
}
