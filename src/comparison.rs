// src/comparison.rs
use crate::config::{ComparisonConfig, DEFAULT_STRATEGY};
use crate::keypoint::{Keypoint, Pose};
use crate::strategy::{
    aligned_distance, enhanced_angle, hand_aware, hybrid, simple_distance, vector_similarity,
    AlignedDistanceStrategy, EnhancedAngleStrategy, HandAwareStrategy, HybridStrategy,
    PoseStrategy, ScoreOptions, SimpleDistanceStrategy, VectorSimilarityStrategy,
};
use std::collections::BTreeMap;
use tracing::{error, warn};

pub type StrategyConstructor = fn(&ComparisonConfig) -> Box<dyn PoseStrategy>;

/// Name -> constructor table for the available strategies.
#[derive(Clone)]
pub struct StrategyRegistry {
    constructors: BTreeMap<&'static str, StrategyConstructor>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(enhanced_angle::NAME, |config| {
            Box::new(EnhancedAngleStrategy::new(config.min_confidence))
        });
        registry.register(aligned_distance::NAME, |config| {
            Box::new(AlignedDistanceStrategy::new(config.min_confidence))
        });
        registry.register(vector_similarity::NAME, |config| {
            Box::new(VectorSimilarityStrategy::new(config.min_confidence))
        });
        registry.register(hybrid::NAME, build_hybrid);
        registry.register(hand_aware::NAME, |config| {
            Box::new(HandAwareStrategy::new(config.min_confidence))
        });
        registry.register(simple_distance::NAME, |_| Box::new(SimpleDistanceStrategy));
        registry
    }
}

fn build_hybrid(config: &ComparisonConfig) -> Box<dyn PoseStrategy> {
    let strategy = HybridStrategy::new(config.min_confidence)
        .with_disagreement_threshold(config.disagreement_threshold);
    match strategy.clone().with_weights(config.hybrid_weights) {
        Ok(strategy) => Box::new(strategy),
        Err(err) => {
            error!(%err, "ignoring configured hybrid weights");
            Box::new(strategy)
        }
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, constructor: StrategyConstructor) {
        self.constructors.insert(name, constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    pub fn build(&self, name: &str, config: &ComparisonConfig) -> Option<Box<dyn PoseStrategy>> {
        self.constructors.get(name).map(|construct| construct(config))
    }
}

/// Entry point for callers: one selected strategy plus the settings it
/// was built with.
pub struct PoseComparison {
    registry: StrategyRegistry,
    config: ComparisonConfig,
    strategy: Box<dyn PoseStrategy>,
}

impl Default for PoseComparison {
    fn default() -> Self {
        Self::new(ComparisonConfig::default())
    }
}

impl PoseComparison {
    pub fn new(config: ComparisonConfig) -> Self {
        Self::with_registry(StrategyRegistry::default(), config)
    }

    pub fn with_registry(registry: StrategyRegistry, config: ComparisonConfig) -> Self {
        let strategy = resolve(&registry, &config.strategy, &config);
        Self {
            registry,
            config,
            strategy,
        }
    }

    /// Convenience constructor selecting `name` with default settings.
    pub fn with_strategy(name: &str) -> Self {
        Self::new(ComparisonConfig {
            strategy: name.to_string(),
            ..ComparisonConfig::default()
        })
    }

    /// Switches strategy; unknown names fall back to the default. Returns
    /// the name of the strategy now in use.
    pub fn set_strategy(&mut self, name: &str) -> &'static str {
        self.strategy = resolve(&self.registry, name, &self.config);
        self.strategy.name()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Scores bare keypoint lists with the configured options.
    pub fn calculate_pose_similarity(&self, player: &[Keypoint], target: &[Keypoint]) -> u8 {
        self.compare(&Pose::new(player.to_vec()), &Pose::new(target.to_vec()))
    }

    /// Scores full poses (hands included) with the configured options.
    pub fn compare(&self, player: &Pose, target: &Pose) -> u8 {
        self.strategy
            .score(player, target, &self.config.score_options())
    }

    pub fn calculate_pose_similarity_with(&self, player: &Pose, target: &Pose, options: &ScoreOptions) -> u8 {
        self.strategy.score(player, target, options)
    }
}

fn resolve(registry: &StrategyRegistry, name: &str, config: &ComparisonConfig) -> Box<dyn PoseStrategy> {
    if let Some(strategy) = registry.build(name, config) {
        return strategy;
    }
    warn!(requested = name, fallback = DEFAULT_STRATEGY, "unknown pose comparison strategy");
    match registry.build(DEFAULT_STRATEGY, config) {
        Some(strategy) => strategy,
        None => Box::new(EnhancedAngleStrategy::new(config.min_confidence)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn default_registry_lists_every_strategy() {
        let registry = StrategyRegistry::default();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "aligned-distance",
                "enhanced-angle",
                "hand-aware-angle",
                "hybrid",
                "simple-distance",
                "vector-similarity",
            ]
        );
    }

    #[test]
    fn built_strategies_report_their_name() {
        let registry = StrategyRegistry::default();
        let config = ComparisonConfig::default();
        for name in registry.names() {
            assert_eq!(registry.build(name, &config).unwrap().name(), name);
        }
    }

    #[test]
    fn unknown_strategy_falls_back_to_default() {
        let comparison = PoseComparison::with_strategy("no-such-strategy");
        assert_eq!(comparison.strategy_name(), "enhanced-angle");
    }

    #[test]
    fn set_strategy_switches_and_falls_back() {
        let mut comparison = PoseComparison::default();
        assert_eq!(comparison.set_strategy("hybrid"), "hybrid");
        assert_eq!(comparison.strategy_name(), "hybrid");
        assert_eq!(comparison.set_strategy("bogus"), "enhanced-angle");
    }

    #[test]
    fn default_falls_back_even_with_custom_registry() {
        let comparison = PoseComparison::with_registry(StrategyRegistry::empty(), ComparisonConfig::default());
        assert_eq!(comparison.strategy_name(), "enhanced-angle");
    }

    #[test]
    fn facade_scores_samples() {
        let comparison = PoseComparison::default();
        assert_eq!(comparison.calculate_pose_similarity(&samples::TARGET, &samples::TARGET), 100);
        assert_eq!(comparison.calculate_pose_similarity(&[], &samples::TARGET), 0);
    }

    #[test]
    fn per_call_options_reach_the_strategy() {
        let comparison = PoseComparison::with_strategy("hand-aware-angle");
        let pose = Pose::new(samples::TARGET.clone()).with_hands(Vec::new());
        let neutral = ScoreOptions::default();
        let hands_only = ScoreOptions {
            hand_weight: 1.0,
            ..ScoreOptions::default()
        };
        assert_eq!(comparison.calculate_pose_similarity_with(&pose, &pose, &neutral), 100);
        assert_eq!(
            comparison.calculate_pose_similarity_with(&pose, &Pose::new(samples::TARGET.clone()), &hands_only),
            50
        );
    }

    #[test]
    fn invalid_hybrid_weights_keep_defaults() {
        let config = ComparisonConfig {
            strategy: "hybrid".to_string(),
            hybrid_weights: crate::strategy::HybridWeights {
                angle: 0.0,
                aligned: 0.0,
                vector: 0.0,
            },
            ..ComparisonConfig::default()
        };
        let comparison = PoseComparison::new(config);
        assert_eq!(comparison.strategy_name(), "hybrid");
        assert!(comparison.calculate_pose_similarity(&samples::TARGET, &samples::TARGET) >= 95);
    }
}
