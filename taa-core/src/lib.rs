//! TAA Core — price history, hysteresis bands, per-window trend states, allocation snapshots.
//!
//! This crate contains the deterministic heart of the allocation signal:
//! - Domain types (aligned price history, window states)
//! - Immutable strategy configuration with startup validation
//! - Band calculator (trailing moving average with upper/lower hysteresis bands)
//! - Hysteresis state machine, one boolean per (asset, window), advanced day by day
//! - Signal aggregation (score → scalar → target weight) and portfolio snapshots
//! - Day-over-day rebalance comparison
//! - The market-data boundary (provider trait, Yahoo chart provider, CSV import)
//!
//! Both the live two-day wrapper and the full-history backtest consume the same
//! `SignalEngine::replay`, so their per-day weights cannot drift apart.

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;

pub use config::{AssetConfig, ConfigError, StrategyConfig};
pub use domain::{HistoryError, PriceHistory, WindowState};
pub use engine::{
    compare, AssetSignal, Band, EngineError, PortfolioSnapshot, RebalanceEvent, SignalEngine,
    WeightDelta,
};
