//! Signal aggregation: window states → score → scalar → target weight.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, StrategyConfig};
use crate::domain::WindowState;

use super::bands::Band;

/// One window's state on one day, kept with its band for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowReading {
    pub window: usize,
    pub state: WindowState,
    pub band: Option<Band>,
}

/// Per-asset signal for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSignal {
    pub symbol: String,
    pub close: f64,
    /// Number of windows in the ON state (0..=W).
    pub score: usize,
    pub scalar: f64,
    pub base_weight: f64,
    pub target_weight: f64,
    pub windows: Vec<WindowReading>,
}

impl AssetSignal {
    pub fn states(&self) -> Vec<WindowState> {
        self.windows.iter().map(|r| r.state).collect()
    }
}

/// Score/scalar/weight lookup built from a validated configuration.
#[derive(Debug, Clone)]
pub struct SignalAggregator {
    symbols: Vec<String>,
    base_weights: Vec<f64>,
    windows: Vec<usize>,
    /// Indexed by score.
    scalars: Vec<f64>,
}

impl SignalAggregator {
    pub fn from_config(config: &StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scalars = (0..=config.window_count())
            .map(|score| {
                config
                    .scalar_map
                    .get(&score)
                    .copied()
                    .ok_or(ConfigError::MissingScalar { score })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbols: config.assets.iter().map(|a| a.symbol.clone()).collect(),
            base_weights: config.assets.iter().map(|a| a.base_weight).collect(),
            windows: config.windows.clone(),
            scalars,
        })
    }

    pub fn score(states: &[WindowState]) -> usize {
        states.iter().filter(|s| s.is_on()).count()
    }

    /// Scalar for a score. Scores above the window count cannot be produced
    /// by the machine.
    pub fn scalar_for(&self, score: usize) -> f64 {
        self.scalars[score]
    }

    pub fn asset_count(&self) -> usize {
        self.symbols.len()
    }

    /// Combine one asset's window states (in configured window order).
    pub fn aggregate(
        &self,
        asset: usize,
        close: f64,
        states: &[WindowState],
        bands: &[Option<Band>],
    ) -> AssetSignal {
        debug_assert_eq!(states.len(), self.windows.len());
        let score = Self::score(states);
        let scalar = self.scalar_for(score);
        let base_weight = self.base_weights[asset];
        let windows = self
            .windows
            .iter()
            .zip(states)
            .zip(bands)
            .map(|((&window, &state), &band)| WindowReading {
                window,
                state,
                band,
            })
            .collect();

        AssetSignal {
            symbol: self.symbols[asset].clone(),
            close,
            score,
            scalar,
            base_weight,
            target_weight: base_weight * scalar,
            windows,
        }
    }
}
