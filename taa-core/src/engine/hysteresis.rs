//! Hysteresis state machine — one ON/OFF state per (asset, window).
//!
//! Transition, evaluated once per trading day:
//!
//! ```text
//! band undefined            → OFF
//! previous ON               → ON iff price >= lower   (inclusive exit boundary)
//! previous OFF              → ON iff price >  upper   (exclusive entry boundary)
//! ```
//!
//! Inside `(lower, upper]` the previous state is kept. The result depends on
//! the previous day's state, so days must be evaluated in order, starting from
//! the first row of the history.

use crate::domain::WindowState;

use super::bands::{Band, BandTable};

/// Pure transition `(previous state, today's observation) → new state`.
pub fn transition(previous: WindowState, price: f64, band: Option<&Band>) -> WindowState {
    let Some(band) = band else {
        return WindowState::Off;
    };
    match previous {
        WindowState::On => WindowState::from_bool(price >= band.lower),
        WindowState::Off => WindowState::from_bool(price > band.upper),
    }
}

/// Driver owning the state array, indexed `[asset * windows + window]`.
///
/// Each replay builds a fresh machine; nothing survives between replays.
#[derive(Debug, Clone)]
pub struct HysteresisMachine {
    assets: usize,
    windows: usize,
    states: Vec<WindowState>,
}

impl HysteresisMachine {
    /// All states OFF, positioned before day 0.
    pub fn new(assets: usize, windows: usize) -> Self {
        Self {
            assets,
            windows,
            states: vec![WindowState::Off; assets * windows],
        }
    }

    pub fn state(&self, asset: usize, window: usize) -> WindowState {
        self.states[asset * self.windows + window]
    }

    /// States of every window of one asset, in configured window order.
    pub fn asset_states(&self, asset: usize) -> &[WindowState] {
        let start = asset * self.windows;
        &self.states[start..start + self.windows]
    }

    /// Advance every (asset, window) by one day.
    ///
    /// `prices[a]` is today's close of engine asset `a`. Callers feed days in
    /// order from row 0.
    pub fn advance(&mut self, day: usize, prices: &[f64], bands: &BandTable) {
        debug_assert_eq!(prices.len(), self.assets);
        for (asset, &price) in prices.iter().enumerate() {
            for window in 0..self.windows {
                let idx = asset * self.windows + window;
                let band = bands.get(asset, window, day);
                self.states[idx] = transition(self.states[idx], price, band);
            }
        }
    }
}
