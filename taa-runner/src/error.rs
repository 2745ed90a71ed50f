use chrono::NaiveDate;
use thiserror::Error;

use taa_core::config::ConfigError;
use taa_core::data::DataError;
use taa_core::engine::EngineError;

/// Errors from the live and backtest wrappers.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("backtest start {start} is after the last row of the history ({last})")]
    StartAfterHistory { start: NaiveDate, last: NaiveDate },
}
