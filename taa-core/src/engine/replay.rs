//! SignalEngine — the single replay driver shared by the live and backtest paths.
//!
//! Construction validates the configuration, resolves asset columns, checks
//! that the history is long enough, and precomputes every band. `replay()`
//! then walks the history from row 0 with a fresh `HysteresisMachine`,
//! yielding one `PortfolioSnapshot` per row.

use tracing::debug;

use crate::config::StrategyConfig;
use crate::domain::PriceHistory;

use super::aggregate::SignalAggregator;
use super::bands::{Band, BandTable};
use super::hysteresis::HysteresisMachine;
use super::snapshot::PortfolioSnapshot;
use super::EngineError;

/// Immutable engine over one configuration and one price history.
#[derive(Debug, Clone)]
pub struct SignalEngine<'h> {
    config: StrategyConfig,
    history: &'h PriceHistory,
    /// History column of each configured asset.
    columns: Vec<usize>,
    bands: BandTable,
    aggregator: SignalAggregator,
}

impl<'h> SignalEngine<'h> {
    pub fn new(config: &StrategyConfig, history: &'h PriceHistory) -> Result<Self, EngineError> {
        let aggregator = SignalAggregator::from_config(config)?;

        let columns = config
            .assets
            .iter()
            .map(|asset| {
                history
                    .column(&asset.symbol)
                    .ok_or_else(|| EngineError::UnknownAsset(asset.symbol.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let required = config.max_window();
        if history.len() < required {
            return Err(EngineError::DataUnavailable {
                rows: history.len(),
                required,
            });
        }

        let bands = BandTable::compute(history, &columns, &config.windows, config.band_pct);

        Ok(Self {
            config: config.clone(),
            history,
            columns,
            bands,
            aggregator,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn history(&self) -> &'h PriceHistory {
        self.history
    }

    /// History column of configured asset `asset`.
    pub fn column(&self, asset: usize) -> usize {
        self.columns[asset]
    }

    pub fn band(&self, asset: usize, window: usize, day: usize) -> Option<&Band> {
        self.bands.get(asset, window, day)
    }

    /// Sequential replay from the first row of the history.
    pub fn replay(&self) -> Replay<'_, 'h> {
        Replay {
            engine: self,
            machine: HysteresisMachine::new(self.columns.len(), self.config.window_count()),
            day: 0,
        }
    }

    /// Snapshots of the last two rows ("yesterday", "today"), taken from one
    /// continuous replay.
    pub fn last_two(&self) -> Result<(PortfolioSnapshot, PortfolioSnapshot), EngineError> {
        let rows = self.history.len();
        if rows < 2 {
            return Err(EngineError::DataUnavailable { rows, required: 2 });
        }
        let mut yesterday = None;
        let mut today = None;
        for snapshot in self.replay() {
            if snapshot.day + 2 == rows {
                yesterday = Some(snapshot);
            } else if snapshot.day + 1 == rows {
                today = Some(snapshot);
            }
        }
        debug!(rows, "replay complete");
        match (yesterday, today) {
            (Some(y), Some(t)) => Ok((y, t)),
            _ => Err(EngineError::DataUnavailable { rows, required: 2 }),
        }
    }

    /// Snapshot of one row, replayed from row 0.
    pub fn snapshot_at(&self, day: usize) -> Option<PortfolioSnapshot> {
        self.replay().nth(day)
    }
}

/// Iterator over one sequential replay. Owns its state machine.
#[derive(Debug)]
pub struct Replay<'e, 'h> {
    engine: &'e SignalEngine<'h>,
    machine: HysteresisMachine,
    day: usize,
}

impl Iterator for Replay<'_, '_> {
    type Item = PortfolioSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        let engine = self.engine;
        let history = engine.history;
        let day = self.day;
        let date = history.date(day)?;

        let prices: Vec<f64> = engine
            .columns
            .iter()
            .map(|&column| history.close(column, day))
            .collect();
        self.machine.advance(day, &prices, &engine.bands);

        let windows = engine.config.window_count();
        let signals = (0..engine.columns.len())
            .map(|asset| {
                let bands: Vec<Option<Band>> = (0..windows)
                    .map(|w| engine.bands.get(asset, w, day).copied())
                    .collect();
                engine
                    .aggregator
                    .aggregate(asset, prices[asset], self.machine.asset_states(asset), &bands)
            })
            .collect();

        self.day += 1;
        Some(PortfolioSnapshot::build(date, day, signals))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.engine.history.len().saturating_sub(self.day);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Replay<'_, '_> {}
