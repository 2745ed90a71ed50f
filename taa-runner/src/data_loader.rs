//! Price loading for a configuration: the symbols it names, over a date range.

use chrono::NaiveDate;

use taa_core::config::StrategyConfig;
use taa_core::data::{load_history, PriceProvider};
use taa_core::domain::PriceHistory;

use crate::error::RunError;

/// Validate `config`, then fetch and align its symbols.
///
/// Validation runs before any network call so a bad configuration never
/// costs a download.
pub fn load_for_config(
    provider: &dyn PriceProvider,
    config: &StrategyConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceHistory, RunError> {
    config.validate()?;
    Ok(load_history(provider, &config.symbols(), start, end)?)
}
