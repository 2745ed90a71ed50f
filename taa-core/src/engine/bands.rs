//! Band calculator — trailing moving average with upper/lower hysteresis bands.
//!
//! `ma(i) = mean(close[i-w+1..=i])`, `upper = ma·(1+n)`, `lower = ma·(1-n)`.
//! Undefined for the first `w-1` rows, and on any row whose window contains
//! an absent (NaN) close.

use serde::{Deserialize, Serialize};

use crate::domain::PriceHistory;

/// Moving average and its hysteresis band for one (asset, window, day).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub ma: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    pub fn around(ma: f64, band_pct: f64) -> Self {
        Self {
            ma,
            upper: ma * (1.0 + band_pct),
            lower: ma * (1.0 - band_pct),
        }
    }

    /// Distance of `price` from the moving average, as a fraction.
    pub fn disparity(&self, price: f64) -> f64 {
        price / self.ma - 1.0
    }
}

/// Trailing simple moving average; NaN where undefined.
///
/// Every window is summed from scratch, so the value on row `i` depends only
/// on rows `i-w+1..=i`.
pub fn rolling_mean(closes: &[f64], window: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &closes[(i + 1 - window)..=i];
        if slice.iter().any(|c| c.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Bands for every row of one close series.
pub fn compute_bands(closes: &[f64], window: usize, band_pct: f64) -> Vec<Option<Band>> {
    rolling_mean(closes, window)
        .into_iter()
        .map(|ma| (!ma.is_nan()).then(|| Band::around(ma, band_pct)))
        .collect()
}

/// Band calculator for one window length.
#[derive(Debug, Clone, Copy)]
pub struct BandCalculator {
    window: usize,
    band_pct: f64,
}

impl BandCalculator {
    pub fn new(window: usize, band_pct: f64) -> Self {
        assert!(window >= 1, "window must be >= 1");
        Self { window, band_pct }
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<Option<Band>> {
        compute_bands(closes, self.window, self.band_pct)
    }
}

/// Precomputed bands for every (asset, window, day), flattened.
#[derive(Debug, Clone)]
pub struct BandTable {
    windows: usize,
    days: usize,
    bands: Vec<Option<Band>>,
}

impl BandTable {
    /// `columns[a]` is the history column of engine asset `a`.
    pub fn compute(
        history: &PriceHistory,
        columns: &[usize],
        windows: &[usize],
        band_pct: f64,
    ) -> Self {
        let days = history.len();
        let mut bands = Vec::with_capacity(columns.len() * windows.len() * days);
        for &column in columns {
            let closes = history.closes(column);
            for &window in windows {
                bands.extend(BandCalculator::new(window, band_pct).compute(closes));
            }
        }
        Self {
            windows: windows.len(),
            days,
            bands,
        }
    }

    pub fn get(&self, asset: usize, window: usize, day: usize) -> Option<&Band> {
        self.bands[(asset * self.windows + window) * self.days + day].as_ref()
    }

    pub fn days(&self) -> usize {
        self.days
    }
}
