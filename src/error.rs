// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoringError>;

/// Failures inside the scoring engine.
///
/// Strategies never hand these to callers: every public `score` boundary
/// logs the error and reports a similarity of 0 instead.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("pose has no keypoints above the confidence floor")]
    EmptyPose,

    #[error("non-finite value while computing {stage}")]
    NonFinite { stage: &'static str },

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejects NaN and infinities produced by degenerate geometry.
pub fn ensure_finite(value: f64, stage: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::NonFinite { stage })
    }
}
