//! The shared signal engine.
//!
//! Pipeline per trading day, strictly in chronological order:
//! bands (precomputed) → hysteresis transition per (asset, window) → score
//! → scalar → target weight → snapshot. The live wrapper keeps the last two
//! snapshots of a replay; the backtest consumes every snapshot.

pub mod aggregate;
pub mod bands;
pub mod hysteresis;
pub mod rebalance;
pub mod replay;
pub mod snapshot;

pub use aggregate::{AssetSignal, SignalAggregator, WindowReading};
pub use bands::{compute_bands, rolling_mean, Band, BandCalculator, BandTable};
pub use hysteresis::{transition, HysteresisMachine};
pub use rebalance::{compare, RebalanceEvent, WeightDelta, WEIGHT_TOLERANCE};
pub use replay::{Replay, SignalEngine};
pub use snapshot::PortfolioSnapshot;

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised before or while driving a replay.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid strategy configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("insufficient history: {rows} rows, at least {required} required")]
    DataUnavailable { rows: usize, required: usize },

    #[error("asset '{0}' is not present in the price history")]
    UnknownAsset(String),
}
