//! Rebalance comparator — diff two snapshots.
//!
//! The decision compares the score-derived scalar vectors exactly. The weight
//! deltas carry a display tolerance and never feed into the decision.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::snapshot::PortfolioSnapshot;

/// Deltas smaller than this are shown as unchanged.
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDelta {
    /// Asset symbol, or `"CASH"` for the residual.
    pub label: String,
    pub yesterday: f64,
    pub today: f64,
    pub delta: f64,
}

impl WeightDelta {
    fn new(label: impl Into<String>, yesterday: f64, today: f64) -> Self {
        Self {
            label: label.into(),
            yesterday,
            today,
            delta: today - yesterday,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.delta.abs() < WEIGHT_TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub needs_rebalance: bool,
    /// Symbols whose scalar changed.
    pub changed: Vec<String>,
    pub assets: Vec<WeightDelta>,
    pub cash: WeightDelta,
}

/// Compare `today` against `yesterday`. Both must come from the same
/// configuration, so their asset lists line up.
pub fn compare(yesterday: &PortfolioSnapshot, today: &PortfolioSnapshot) -> RebalanceEvent {
    debug_assert_eq!(yesterday.signals.len(), today.signals.len());
    let changed: Vec<String> = yesterday
        .signals
        .iter()
        .zip(&today.signals)
        .filter(|(y, t)| y.scalar != t.scalar)
        .map(|(_, t)| t.symbol.clone())
        .collect();

    let assets = yesterday
        .signals
        .iter()
        .zip(&today.signals)
        .map(|(y, t)| WeightDelta::new(t.symbol.clone(), y.target_weight, t.target_weight))
        .collect();

    RebalanceEvent {
        from: yesterday.date,
        to: today.date,
        needs_rebalance: !changed.is_empty() || yesterday.signals.len() != today.signals.len(),
        changed,
        assets,
        cash: WeightDelta::new("CASH", yesterday.cash_weight, today.cash_weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AssetSignal;

    fn signal(symbol: &str, base: f64, score: usize, scalar: f64) -> AssetSignal {
        AssetSignal {
            symbol: symbol.into(),
            close: 1.0,
            score,
            scalar,
            base_weight: base,
            target_weight: base * scalar,
            windows: Vec::new(),
        }
    }

    fn snap(day: u32, signals: Vec<AssetSignal>) -> PortfolioSnapshot {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        PortfolioSnapshot::build(date, day as usize, signals)
    }

    #[test]
    fn identical_scalars_no_rebalance() {
        let y = snap(1, vec![signal("A", 0.6, 1, 0.5), signal("B", 0.4, 2, 1.0)]);
        let t = snap(2, vec![signal("A", 0.6, 1, 0.5), signal("B", 0.4, 2, 1.0)]);
        let event = compare(&y, &t);
        assert!(!event.needs_rebalance);
        assert!(event.changed.is_empty());
        assert!(event.assets.iter().all(|d| d.is_unchanged()));
        assert!(event.cash.is_unchanged());
    }

    #[test]
    fn any_scalar_change_triggers_rebalance() {
        let y = snap(1, vec![signal("A", 0.6, 2, 0.75), signal("B", 0.4, 0, 0.0)]);
        let t = snap(2, vec![signal("A", 0.6, 3, 1.0), signal("B", 0.4, 0, 0.0)]);
        let event = compare(&y, &t);
        assert!(event.needs_rebalance);
        assert_eq!(event.changed, vec!["A".to_string()]);
        assert!((event.assets[0].delta - 0.15).abs() < 1e-12);
        assert!((event.cash.delta + 0.15).abs() < 1e-12);
    }

    #[test]
    fn tiny_weight_delta_still_rebalances() {
        // Base weight so small the weight delta falls under the display tolerance.
        let y = snap(1, vec![signal("A", 0.0001, 2, 0.75)]);
        let t = snap(2, vec![signal("A", 0.0001, 3, 1.0)]);
        let event = compare(&y, &t);
        assert!(event.needs_rebalance);
        assert!(event.assets[0].is_unchanged());
    }

    #[test]
    fn score_change_with_same_scalar_does_not_rebalance() {
        let y = snap(1, vec![signal("A", 0.5, 0, 0.0)]);
        let t = snap(2, vec![signal("A", 0.5, 1, 0.0)]);
        assert!(!compare(&y, &t).needs_rebalance);
    }
}
