// src/data.rs
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One strategy's score for one player/target pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub case: String,
    pub player: String,
    pub target: String,
    pub strategy: String,
    pub score: u8,
}

/// Collects comparison results and writes them out as a table or CSV.
pub struct ReportExporter {
    output_dir: PathBuf,
    session_name: String,
    rows: Vec<ComparisonRow>,
}

impl ReportExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("comparison_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            rows: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn add_result(&mut self, row: ComparisonRow) {
        self.rows.push(row);
    }

    /// Mean score per strategy, ordered by strategy name.
    pub fn strategy_means(&self) -> BTreeMap<&str, f64> {
        let mut totals: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        for row in &self.rows {
            let entry = totals.entry(row.strategy.as_str()).or_default();
            entry.0 += u32::from(row.score);
            entry.1 += 1;
        }
        totals
            .into_iter()
            .map(|(strategy, (sum, count))| (strategy, f64::from(sum) / f64::from(count)))
            .collect()
    }

    /// Plain-text table: one line per case, one column per strategy.
    pub fn render_table(&self) -> String {
        let strategies: Vec<&str> = self.strategy_means().into_keys().collect();
        let mut cases: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !cases.contains(&row.case.as_str()) {
                cases.push(&row.case);
            }
        }

        let case_width = cases.iter().map(|c| c.len()).max().unwrap_or(0).max("case".len());
        let column = |strategy: &str, cell: &str| format!("{cell:>w$}", w = strategy.len().max(3));

        let header = std::iter::once(format!("{:<case_width$}", "case"))
            .chain(strategies.iter().map(|s| column(*s, *s)))
            .collect::<Vec<_>>()
            .join("  ");

        let body = cases.into_iter().map(|case| {
            std::iter::once(format!("{case:<case_width$}"))
                .chain(strategies.iter().map(|strategy| {
                    let cell = self
                        .rows
                        .iter()
                        .find(|r| r.case == case && r.strategy == *strategy)
                        .map_or_else(|| "-".to_string(), |r| r.score.to_string());
                    column(*strategy, cell.as_str())
                }))
                .collect::<Vec<_>>()
                .join("  ")
        });

        std::iter::once(header)
            .chain(body)
            .map(|line| line + "\n")
            .collect()
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self
            .output_dir
            .join(&self.session_name)
            .join("comparison.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("creating {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(csv_path)
    }
}
