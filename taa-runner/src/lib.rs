//! TAA Runner — the live and backtest wrappers over `taa-core`'s shared replay.
//!
//! This crate provides:
//! - Price loading for a configuration
//! - The live two-day signal and its rebalance decision
//! - The full-history backtest runner, including parallel runs over several configurations
//! - Performance metrics (CAGR, max drawdown, Sharpe)
//! - Text payloads (daily report, backtest summary)
//! - Notification delivery (Telegram)
//! - Backtest artifact export

pub mod artifacts;
pub mod backtest;
pub mod data_loader;
pub mod error;
pub mod live;
pub mod metrics;
pub mod notify;
pub mod report;

pub use artifacts::{ArtifactPaths, ArtifactWriter, BacktestSummary};
pub use backtest::{run_many, BacktestResult, BacktestRunner, CurvePoint};
pub use data_loader::load_for_config;
pub use error::RunError;
pub use live::{
    last_settled_date, lookback_start, settled_history, LiveSignal, LIVE_LOOKBACK_DAYS,
    SESSION_SETTLED_UTC_HOUR,
};
pub use metrics::PerformanceMetrics;
pub use notify::{
    deliver_all, DeliveryError, DeliveryOutcome, Notifier, TelegramNotifier, TelegramSettings,
};
pub use report::{render_backtest_summary, render_signal_report, SignalReport};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn results_are_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<LiveSignal>();
        assert_sync::<LiveSignal>();
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<DeliveryError>();
        assert_sync::<DeliveryError>();
    }

    #[test]
    fn telegram_notifier_is_send_sync() {
        assert_send::<TelegramNotifier>();
        assert_sync::<TelegramNotifier>();
    }
}
