// src/strategy/hybrid.rs
//
// Runs the angle, aligned and vector strategies side by side. When they
// agree the scores are blended; when they disagree the input quality
// decides which of them to trust.
use super::{
    to_score, AlignedDistanceStrategy, EnhancedAngleStrategy, PoseStrategy, ScoreOptions,
    VectorSimilarityStrategy,
};
use crate::error::{ensure_finite, Result, ScoringError};
use crate::keypoint::{labels, KeypointIndex, Pose, MIN_CONFIDENCE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const NAME: &str = "hybrid";

/// Spread (max - min) above which the base strategies are said to disagree.
pub const DISAGREEMENT_THRESHOLD: f64 = 25.0;

/// Below this data quality only the aligned-distance score is trusted.
pub const QUALITY_FLOOR: f64 = 0.5;

const QUALITY_CONFIDENCE_SHARE: f64 = 0.6;
const QUALITY_COVERAGE_SHARE: f64 = 0.4;

const CORE_UPPER_BODY: [&str; 6] = [
    labels::LEFT_SHOULDER,
    labels::RIGHT_SHOULDER,
    labels::LEFT_ELBOW,
    labels::RIGHT_ELBOW,
    labels::LEFT_WRIST,
    labels::RIGHT_WRIST,
];

const DISAGREEMENT_WEIGHTS: HybridWeights = HybridWeights {
    angle: 0.6,
    aligned: 0.25,
    vector: 0.15,
};

/// Blend applied when the base strategies agree. Always sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    pub angle: f64,
    pub aligned: f64,
    pub vector: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            angle: 0.5,
            aligned: 0.3,
            vector: 0.2,
        }
    }
}

impl HybridWeights {
    /// Rescales the triple to sum to 1.
    pub fn normalized(self) -> Result<Self> {
        let parts = [self.angle, self.aligned, self.vector];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScoringError::InvalidWeights(format!(
                "weights must be finite and non-negative, got {parts:?}"
            )));
        }
        let sum: f64 = parts.iter().sum();
        if sum <= 0.0 {
            return Err(ScoringError::InvalidWeights("weights sum to zero".to_string()));
        }
        Ok(Self {
            angle: self.angle / sum,
            aligned: self.aligned / sum,
            vector: self.vector / sum,
        })
    }

    fn blend(&self, scores: &BaseScores) -> f64 {
        f64::from(scores.angle) * self.angle
            + f64::from(scores.aligned) * self.aligned
            + f64::from(scores.vector) * self.vector
    }
}

/// Results of the three base strategies for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseScores {
    pub angle: u8,
    pub aligned: u8,
    pub vector: u8,
}

impl BaseScores {
    pub fn spread(&self) -> u8 {
        let max = self.angle.max(self.aligned).max(self.vector);
        let min = self.angle.min(self.aligned).min(self.vector);
        max - min
    }
}

/// Which combination rule produced a hybrid score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridPath {
    Blend,
    QualityFallback,
    AlignedOnly,
}

/// `0.6 × mean confidence + 0.4 × share of the six core upper-body points
/// present`, in `[0, 1]`. An empty pose has quality 0.
pub fn data_quality(index: &KeypointIndex) -> f64 {
    let Some(mean_confidence) = index.mean_confidence() else {
        return 0.0;
    };
    let present = CORE_UPPER_BODY
        .iter()
        .filter(|label| index.contains(label))
        .count();
    let coverage = present as f64 / CORE_UPPER_BODY.len() as f64;
    QUALITY_CONFIDENCE_SHARE * mean_confidence + QUALITY_COVERAGE_SHARE * coverage
}

#[derive(Debug, Clone)]
pub struct HybridStrategy {
    enhanced: EnhancedAngleStrategy,
    aligned: AlignedDistanceStrategy,
    vector: VectorSimilarityStrategy,
    weights: HybridWeights,
    disagreement_threshold: f64,
    min_confidence: f64,
}

impl Default for HybridStrategy {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE)
    }
}

impl HybridStrategy {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            enhanced: EnhancedAngleStrategy::new(min_confidence),
            aligned: AlignedDistanceStrategy::new(min_confidence),
            vector: VectorSimilarityStrategy::new(min_confidence),
            weights: HybridWeights::default(),
            disagreement_threshold: DISAGREEMENT_THRESHOLD,
            min_confidence,
        }
    }

    pub fn with_weights(mut self, weights: HybridWeights) -> Result<Self> {
        self.set_weights(weights)?;
        Ok(self)
    }

    pub fn with_disagreement_threshold(mut self, threshold: f64) -> Self {
        self.disagreement_threshold = threshold;
        self
    }

    /// Replaces the agreement blend, renormalizing it to sum to 1. Invalid
    /// triples leave the current weights in place.
    pub fn set_weights(&mut self, weights: HybridWeights) -> Result<()> {
        self.weights = weights.normalized()?;
        Ok(())
    }

    pub fn weights(&self) -> HybridWeights {
        self.weights
    }

    pub fn base_scores(&self, player: &Pose, target: &Pose) -> BaseScores {
        let options = ScoreOptions::default();
        BaseScores {
            angle: self.enhanced.score(player, target, &options),
            aligned: self.aligned.score(player, target, &options),
            vector: self.vector.score(player, target, &options),
        }
    }

    /// Applies the combination rules to precomputed base scores.
    pub fn combine(&self, scores: &BaseScores, player_quality: f64, target_quality: f64) -> (f64, HybridPath) {
        if f64::from(scores.spread()) <= self.disagreement_threshold {
            return (self.weights.blend(scores), HybridPath::Blend);
        }

        if player_quality < QUALITY_FLOOR || target_quality < QUALITY_FLOOR {
            (f64::from(scores.aligned), HybridPath::AlignedOnly)
        } else {
            (DISAGREEMENT_WEIGHTS.blend(scores), HybridPath::QualityFallback)
        }
    }

    /// Base scores that propagate the first base-strategy failure instead
    /// of settling it to 0.
    fn try_base_scores(&self, player: &Pose, target: &Pose) -> Result<BaseScores> {
        Ok(BaseScores {
            angle: to_score(self.enhanced.compare(player, target)?),
            aligned: to_score(self.aligned.compare(player, target)?),
            vector: to_score(self.vector.compare(player, target)?),
        })
    }

    fn compare(&self, player: &Pose, target: &Pose) -> Result<f64> {
        let scores = self.try_base_scores(player, target)?;
        let player_quality = data_quality(&KeypointIndex::from_keypoints(&player.keypoints, self.min_confidence));
        let target_quality = data_quality(&KeypointIndex::from_keypoints(&target.keypoints, self.min_confidence));

        let (value, path) = self.combine(&scores, player_quality, target_quality);
        debug!(
            ?scores,
            player_quality,
            target_quality,
            ?path,
            "hybrid combination"
        );
        ensure_finite(value, "hybrid blend")
    }
}

impl PoseStrategy for HybridStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, player: &Pose, target: &Pose, options: &ScoreOptions) -> u8 {
        match self.compare(player, target) {
            Ok(value) => to_score(value),
            Err(ScoringError::EmptyPose) => self.enhanced.score(player, target, options),
            Err(err) => {
                error!(%err, "hybrid comparison failed, using enhanced-angle score");
                self.enhanced.score(player, target, options)
            }
        }
    }
}
