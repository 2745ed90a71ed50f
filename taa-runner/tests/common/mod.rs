//! Shared fixtures: the 2-asset toy configuration and its 6-day path.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use taa_core::config::{AssetConfig, StrategyConfig};
use taa_core::data::{ClosePoint, DataError, PriceProvider};
use taa_core::domain::PriceHistory;
use taa_runner::notify::{DeliveryError, Notifier};

pub const A: [f64; 6] = [100.0, 100.0, 130.0, 135.0, 120.0, 95.0];
pub const B: [f64; 6] = [50.0, 50.0, 50.0, 60.0, 56.0, 48.0];

pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn toy_config() -> StrategyConfig {
    StrategyConfig {
        name: "toy".into(),
        band_pct: 0.10,
        windows: vec![2, 3],
        assets: vec![AssetConfig::new("A", 0.6), AssetConfig::new("B", 0.4)],
        scalar_map: BTreeMap::from([(0, 0.0), (1, 0.5), (2, 1.0)]),
    }
}

pub fn toy_history() -> PriceHistory {
    PriceHistory::new(
        (1..=6).map(d).collect(),
        vec!["A".into(), "B".into()],
        vec![A.to_vec(), B.to_vec()],
    )
    .unwrap()
}

/// In-memory provider over the toy path.
pub struct MockProvider {
    pub data: HashMap<String, Vec<ClosePoint>>,
}

impl MockProvider {
    pub fn toy() -> Self {
        let mut data = HashMap::new();
        for (symbol, closes) in [("A", A), ("B", B)] {
            let points = closes
                .iter()
                .enumerate()
                .map(|(i, &c)| ClosePoint::new(d(i as u32 + 1), c))
                .collect();
            data.insert(symbol.to_string(), points);
        }
        Self { data }
    }
}

impl PriceProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePoint>, DataError> {
        Ok(self
            .data
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Records every message; fails for the listed destinations.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail_for: Vec<String>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        if self.fail_for.iter().any(|f| f == destination) {
            return Err(DeliveryError::Rejected {
                status: 400,
                body: "chat not found".into(),
            });
        }
        Ok(())
    }
}
