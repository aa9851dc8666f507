// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use pose_match::config::ComparisonConfig;
use pose_match::data::{ComparisonRow, ReportExporter};
use pose_match::detection::load_pose;
use pose_match::{samples, Pose, PoseComparison};
use std::path::PathBuf;

/// Scores a player pose against a target pose. Without files, runs the
/// built-in sample cases through every strategy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"Examples:
    pose_compare
    pose_compare player.json target.json --strategy hybrid
    pose_compare --config settings.json --export reports/"#)]
struct Args {
    /// Detection response or keypoint array for the player
    #[arg(requires = "target")]
    player: Option<PathBuf>,

    /// Detection response or keypoint array for the target
    target: Option<PathBuf>,

    /// Strategy name (enhanced-angle, aligned-distance, vector-similarity, hybrid, hand-aware-angle, simple-distance)
    #[arg(long)]
    strategy: Option<String>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write comparison.csv into a timestamped folder under this directory
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ComparisonConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ComparisonConfig::default(),
    };
    if let Some(strategy) = &args.strategy {
        config.strategy = strategy.clone();
    }
    let output_dir = args.export.clone().unwrap_or_else(|| config.output_directory.clone());
    let mut exporter = ReportExporter::new(output_dir, None);

    match (&args.player, &args.target) {
        (Some(player_path), Some(target_path)) => {
            let player = load_pose(player_path)
                .with_context(|| format!("reading player pose {}", player_path.display()))?;
            let target = load_pose(target_path)
                .with_context(|| format!("reading target pose {}", target_path.display()))?;

            let comparison = PoseComparison::new(config);
            let score = comparison.compare(&player, &target);
            println!("{}: {score}", comparison.strategy_name());
            exporter.add_result(ComparisonRow {
                case: "cli".to_string(),
                player: player_path.display().to_string(),
                target: target_path.display().to_string(),
                strategy: comparison.strategy_name().to_string(),
                score,
            });
        }
        _ => {
            run_samples(config, &mut exporter);
            print!("{}", exporter.render_table());
        }
    }

    if args.export.is_some() {
        let path = exporter.export_csv()?;
        println!("Exported {}", path.display());
    }
    Ok(())
}

/// Scores every built-in sample case with every registered strategy.
fn run_samples(config: ComparisonConfig, exporter: &mut ReportExporter) {
    let mut comparison = PoseComparison::new(config);
    let names: Vec<&'static str> = comparison.registry().names().collect();

    for case in samples::sample_cases() {
        let player = Pose::new(case.player);
        let target = Pose::new(case.target);
        for name in &names {
            comparison.set_strategy(name);
            exporter.add_result(ComparisonRow {
                case: case.name.to_string(),
                player: case.player_label.to_string(),
                target: case.target_label.to_string(),
                strategy: name.to_string(),
                score: comparison.compare(&player, &target),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_samples() {
        let parsed = Args::try_parse_from(["pose_compare"]).unwrap();
        assert!(parsed.player.is_none() && parsed.target.is_none());
    }

    #[test]
    fn positional_files_and_flags() {
        let parsed = Args::try_parse_from([
            "pose_compare",
            "p.json",
            "--strategy",
            "hybrid",
            "t.json",
            "--export",
            "out",
        ])
        .unwrap();
        assert_eq!(parsed.player, Some(PathBuf::from("p.json")));
        assert_eq!(parsed.target, Some(PathBuf::from("t.json")));
        assert_eq!(parsed.strategy.as_deref(), Some("hybrid"));
        assert_eq!(parsed.export, Some(PathBuf::from("out")));
    }

    #[test]
    fn equals_form_is_accepted() {
        let parsed = Args::try_parse_from(["pose_compare", "--strategy=hybrid"]).unwrap();
        assert_eq!(parsed.strategy.as_deref(), Some("hybrid"));
    }

    #[test]
    fn flag_is_not_taken_as_a_value() {
        assert!(Args::try_parse_from(["pose_compare", "--export", "--strategy", "hybrid"]).is_err());
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(Args::try_parse_from(["pose_compare", "only-one.json"]).is_err());
        assert!(Args::try_parse_from(["pose_compare", "--strategy"]).is_err());
        assert!(Args::try_parse_from(["pose_compare", "--frobnicate"]).is_err());
        assert!(Args::try_parse_from(["pose_compare", "a.json", "b.json", "c.json"]).is_err());
    }
}
