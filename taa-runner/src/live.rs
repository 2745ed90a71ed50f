//! Live wrapper: the last two completed sessions of one continuous replay.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use taa_core::config::StrategyConfig;
use taa_core::domain::PriceHistory;
use taa_core::engine::{compare, PortfolioSnapshot, RebalanceEvent, SignalEngine};

use crate::error::RunError;

/// Calendar days of history fetched for a live signal. Covers the longest
/// reference window (200 sessions) with room for hysteresis memory.
pub const LIVE_LOOKBACK_DAYS: i64 = 400;

/// First date to fetch for a live run ending on `today`.
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(LIVE_LOOKBACK_DAYS)
}

/// UTC hour by which the US cash session of the same date has closed, in
/// both standard and daylight time.
pub const SESSION_SETTLED_UTC_HOUR: u32 = 21;

/// Latest date whose daily bar is final at `now`.
pub fn last_settled_date(now: DateTime<Utc>) -> NaiveDate {
    let date = now.date_naive();
    if now.hour() >= SESSION_SETTLED_UTC_HOUR {
        date
    } else {
        date - Duration::days(1)
    }
}

/// `history` without rows dated after `last_settled`.
///
/// A fetch during market hours ends with an intraday bar; the report would
/// label it a close.
pub fn settled_history(history: &PriceHistory, last_settled: NaiveDate) -> PriceHistory {
    let keep = history.dates().partition_point(|d| *d <= last_settled);
    if keep < history.len() {
        info!(
            dropped = history.len() - keep,
            %last_settled,
            "unsettled session rows dropped"
        );
    }
    history.truncated(keep)
}

/// Today's allocation, yesterday's, and the decision between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSignal {
    pub config: StrategyConfig,
    pub yesterday: PortfolioSnapshot,
    pub today: PortfolioSnapshot,
    pub event: RebalanceEvent,
}

impl LiveSignal {
    pub fn compute(config: &StrategyConfig, history: &PriceHistory) -> Result<Self, RunError> {
        let engine = SignalEngine::new(config, history)?;
        let (yesterday, today) = engine.last_two()?;
        let event = compare(&yesterday, &today);

        info!(
            date = %today.date,
            needs_rebalance = event.needs_rebalance,
            changed = ?event.changed,
            cash = today.cash_weight,
            "live signal computed"
        );

        Ok(Self {
            config: config.clone(),
            yesterday,
            today,
            event,
        })
    }

    pub fn needs_rebalance(&self) -> bool {
        self.event.needs_rebalance
    }

    /// Daily close-to-close change per asset for the last session.
    pub fn price_changes(&self) -> Vec<f64> {
        self.yesterday
            .signals
            .iter()
            .zip(&self.today.signals)
            .map(|(y, t)| t.close / y.close - 1.0)
            .collect()
    }
}
