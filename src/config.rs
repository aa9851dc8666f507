// src/config.rs
use crate::error::Result;
use crate::keypoint::MIN_CONFIDENCE;
use crate::strategy::hand_aware::DEFAULT_HAND_WEIGHT;
use crate::strategy::hybrid::DISAGREEMENT_THRESHOLD;
use crate::strategy::{enhanced_angle, HybridWeights, ScoreOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STRATEGY: &str = enhanced_angle::NAME;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub strategy: String,
    pub min_confidence: f64,
    pub hand_weight: f64,
    pub excluded_labels: Vec<String>,
    pub hybrid_weights: HybridWeights,
    pub disagreement_threshold: f64,
    pub output_directory: PathBuf,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            min_confidence: MIN_CONFIDENCE,
            hand_weight: DEFAULT_HAND_WEIGHT,
            excluded_labels: Vec::new(),
            hybrid_weights: HybridWeights::default(),
            disagreement_threshold: DISAGREEMENT_THRESHOLD,
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("PoseMatch")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl ComparisonConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn score_options(&self) -> ScoreOptions {
        ScoreOptions {
            hand_weight: self.hand_weight,
            excluded_labels: self.excluded_labels.clone(),
        }
    }
}
