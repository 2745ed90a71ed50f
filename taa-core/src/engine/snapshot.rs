//! PortfolioSnapshot — one day's target weights, cash residual, and window states.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::AssetSignal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    /// Row index in the price history.
    pub day: usize,
    /// One entry per configured asset, in configured order.
    pub signals: Vec<AssetSignal>,
    /// `1 - Σ target_weight`.
    pub cash_weight: f64,
}

impl PortfolioSnapshot {
    pub fn build(date: NaiveDate, day: usize, signals: Vec<AssetSignal>) -> Self {
        let invested: f64 = signals.iter().map(|s| s.target_weight).sum();
        Self {
            date,
            day,
            signals,
            cash_weight: 1.0 - invested,
        }
    }

    pub fn signal(&self, symbol: &str) -> Option<&AssetSignal> {
        self.signals.iter().find(|s| s.symbol == symbol)
    }

    pub fn weight(&self, symbol: &str) -> Option<f64> {
        self.signal(symbol).map(|s| s.target_weight)
    }

    pub fn weights(&self) -> Vec<f64> {
        self.signals.iter().map(|s| s.target_weight).collect()
    }

    /// The score-derived scalar vector compared by the rebalance decision.
    pub fn scalars(&self) -> Vec<f64> {
        self.signals.iter().map(|s| s.scalar).collect()
    }

    pub fn scores(&self) -> Vec<usize> {
        self.signals.iter().map(|s| s.score).collect()
    }

    pub fn invested_weight(&self) -> f64 {
        1.0 - self.cash_weight
    }
}
