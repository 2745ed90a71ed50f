//! Backtest artifact export: `cumulative.csv` and `summary.json`, one
//! directory per configuration fingerprint.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use taa_core::config::StrategyConfig;

use crate::backtest::BacktestResult;
use crate::metrics::PerformanceMetrics;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub cumulative_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub schema_version: u32,
    pub fingerprint: String,
    pub config: StrategyConfig,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub metrics: PerformanceMetrics,
}

impl BacktestSummary {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            schema_version: result.schema_version,
            fingerprint: result.fingerprint.clone(),
            config: result.config.clone(),
            first_date: result.start_date(),
            last_date: result.end_date(),
            metrics: result.metrics.clone(),
        }
    }
}

#[derive(Serialize)]
struct CurveRow {
    date: NaiveDate,
    daily_return: f64,
    cumulative: f64,
}

/// Writes every artifact of a run under `<output_dir>/<fingerprint>/`.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create artifact directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn write(&self, result: &BacktestResult) -> Result<ArtifactPaths> {
        let dir = self.output_dir.join(&result.fingerprint);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let cumulative_csv = dir.join("cumulative.csv");
        write_cumulative_csv(&cumulative_csv, result)?;

        let summary_json = dir.join("summary.json");
        write_summary_json(&summary_json, result)?;

        info!(dir = %dir.display(), "backtest artifacts written");
        Ok(ArtifactPaths {
            dir,
            cumulative_csv,
            summary_json,
        })
    }
}

pub fn write_cumulative_csv(path: &Path, result: &BacktestResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create cumulative CSV {}", path.display()))?;
    for point in &result.curve {
        writer
            .serialize(CurveRow {
                date: point.date,
                daily_return: point.daily_return,
                cumulative: point.cumulative,
            })
            .context("Failed to write cumulative row")?;
    }
    writer.flush().context("Failed to flush cumulative CSV")?;
    Ok(())
}

pub fn write_summary_json(path: &Path, result: &BacktestResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&BacktestSummary::from_result(result))
        .context("Failed to serialize backtest summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Read a `summary.json` back.
pub fn read_summary_json(path: &Path) -> Result<BacktestSummary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
