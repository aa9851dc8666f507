//! Pose similarity scoring for a pose-matching party game.
//!
//! A player's detected keypoints are compared with a target pose and turned
//! into a score between 0 and 100. Several interchangeable strategies are
//! available behind [`PoseStrategy`]; [`PoseComparison`] selects one by name.
//!
//! ```no_run
//! use pose_match::{samples, PoseComparison};
//!
//! let comparison = PoseComparison::with_strategy("hybrid");
//! let score = comparison.calculate_pose_similarity(&samples::GOOD_PLAYER, &samples::TARGET);
//! println!("{score}");
//! ```

pub mod comparison;
pub mod config;
pub mod data;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod keypoint;
pub mod normalize;
pub mod samples;
pub mod strategy;

pub use comparison::{PoseComparison, StrategyRegistry};
pub use config::ComparisonConfig;
pub use error::{Result, ScoringError};
pub use keypoint::{FrameSize, HandPrediction, Keypoint, KeypointIndex, Pose};
pub use strategy::{PoseStrategy, ScoreOptions};
