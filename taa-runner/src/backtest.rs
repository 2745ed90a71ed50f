//! BacktestRunner — the full-history wrapper over the shared replay.
//!
//! Consumes every snapshot of one `SignalEngine::replay`, accumulating
//! `daily_return[t] = Σ target_weight[a][t] · asset_return[a][t]` from
//! `max(max_window, first row on/after start)` onward. The curve is compounded
//! from a 1.0 anchor on the row before the first return.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use taa_core::config::StrategyConfig;
use taa_core::domain::PriceHistory;
use taa_core::engine::{PortfolioSnapshot, SignalEngine};

use crate::error::RunError;
use crate::metrics::PerformanceMetrics;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// One row of the cumulative curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    /// 0.0 on the anchor row.
    pub daily_return: f64,
    pub cumulative: f64,
    /// Target weight per asset, in configuration order.
    pub weights: Vec<f64>,
}

/// Complete result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: StrategyConfig,
    pub fingerprint: String,
    pub symbols: Vec<String>,
    /// History row index of the first daily return.
    pub first_return_day: usize,
    /// Anchor row first, then one point per daily return.
    pub curve: Vec<CurvePoint>,
    pub metrics: PerformanceMetrics,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Daily returns, anchor excluded.
    pub fn returns(&self) -> Vec<f64> {
        self.curve.iter().skip(1).map(|p| p.daily_return).collect()
    }

    pub fn cumulative(&self) -> Vec<f64> {
        self.curve.iter().map(|p| p.cumulative).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.curve.iter().map(|p| p.date).collect()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.curve.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.curve.last().map(|p| p.date)
    }
}

/// Full-history replay of one configuration over one price history.
#[derive(Debug)]
pub struct BacktestRunner<'h> {
    engine: SignalEngine<'h>,
    start: Option<NaiveDate>,
}

impl<'h> BacktestRunner<'h> {
    pub fn new(config: &StrategyConfig, history: &'h PriceHistory) -> Result<Self, RunError> {
        Ok(Self {
            engine: SignalEngine::new(config, history)?,
            start: None,
        })
    }

    /// Only accumulate returns from the first row on or after `start`.
    /// The replay still begins at row 0.
    pub fn with_start(mut self, start: Option<NaiveDate>) -> Self {
        self.start = start;
        self
    }

    pub fn engine(&self) -> &SignalEngine<'h> {
        &self.engine
    }

    /// History row of the first daily return.
    pub fn first_return_day(&self) -> Result<usize, RunError> {
        let history = self.engine.history();
        let warmup = self.engine.config().max_window();
        let start_row = match self.start {
            None => 0,
            Some(start) => history.first_index_on_or_after(start).ok_or_else(|| {
                RunError::StartAfterHistory {
                    start,
                    last: history.dates().last().copied().unwrap_or(start),
                }
            })?,
        };
        Ok(warmup.max(start_row))
    }

    pub fn run(&self) -> Result<BacktestResult, RunError> {
        let first = self.first_return_day()?;
        let history = self.engine.history();
        let config = self.engine.config();

        let mut curve = Vec::with_capacity(history.len().saturating_sub(first) + 1);
        let mut cumulative = 1.0;
        for snapshot in self.engine.replay() {
            if snapshot.day + 1 < first {
                continue;
            }
            if snapshot.day + 1 == first {
                curve.push(CurvePoint {
                    date: snapshot.date,
                    daily_return: 0.0,
                    cumulative,
                    weights: snapshot.weights(),
                });
                continue;
            }
            let daily_return = self.daily_return(&snapshot);
            cumulative *= 1.0 + daily_return;
            curve.push(CurvePoint {
                date: snapshot.date,
                daily_return,
                cumulative,
                weights: snapshot.weights(),
            });
        }

        let cumulative: Vec<f64> = curve.iter().map(|p| p.cumulative).collect();
        let dates: Vec<NaiveDate> = curve.iter().map(|p| p.date).collect();
        let returns: Vec<f64> = curve.iter().skip(1).map(|p| p.daily_return).collect();
        let metrics = PerformanceMetrics::compute(&cumulative, &dates, &returns);

        info!(
            strategy = %config.name,
            band_pct = config.band_pct,
            returns = metrics.return_days,
            cagr = metrics.cagr,
            mdd = metrics.max_drawdown,
            sharpe = metrics.sharpe,
            "backtest complete"
        );

        Ok(BacktestResult {
            schema_version: SCHEMA_VERSION,
            config: config.clone(),
            fingerprint: config.fingerprint(),
            symbols: config.symbols().into_iter().map(str::to_string).collect(),
            first_return_day: first,
            curve,
            metrics,
        })
    }

    /// Portfolio return of one day from that day's target weights.
    /// An asset whose return involves a missing close contributes nothing.
    fn daily_return(&self, snapshot: &PortfolioSnapshot) -> f64 {
        let history = self.engine.history();
        snapshot
            .signals
            .iter()
            .enumerate()
            .map(|(asset, signal)| {
                let asset_return = history
                    .simple_return(self.engine.column(asset), snapshot.day)
                    .unwrap_or(0.0);
                signal.base_weight * signal.scalar * asset_return
            })
            .sum()
    }
}

/// Backtest several configurations against one immutable history in parallel.
/// Each run owns its own engine and state machines. Results keep input order.
pub fn run_many(
    configs: &[StrategyConfig],
    history: &PriceHistory,
    start: Option<NaiveDate>,
) -> Vec<Result<BacktestResult, RunError>> {
    configs
        .par_iter()
        .map(|config| BacktestRunner::new(config, history)?.with_start(start).run())
        .collect()
}
