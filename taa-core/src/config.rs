//! Strategy configuration — the immutable parameter set handed to the engine.
//!
//! A configuration is validated once, when an engine is built from it. Nothing
//! in the replay path falls back to a default for a missing entry.
//!
//! TOML layout:
//!
//! ```toml
//! name = "Independent-Hysteresis-TAA"
//! band_pct = 0.03
//! windows = [20, 120, 200]
//!
//! [[assets]]
//! symbol = "QQQ"
//! base_weight = 0.45
//!
//! [scalar_map]
//! 0 = 0.0
//! 1 = 0.5
//! 2 = 0.75
//! 3 = 1.0
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hysteresis band half-width (3%).
pub const DEFAULT_BAND_PCT: f64 = 0.03;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Configuration errors, all caught before any replay starts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("asset list is empty")]
    NoAssets,

    #[error("duplicate asset '{0}'")]
    DuplicateAsset(String),

    #[error("base weight for '{symbol}' must be finite and >= 0 (got {weight})")]
    InvalidWeight { symbol: String, weight: f64 },

    #[error("base weights sum to {sum:.6}, which exceeds 1")]
    WeightsExceedOne { sum: f64 },

    #[error("window list is empty")]
    NoWindows,

    #[error("window length must be >= 1")]
    ZeroWindow,

    #[error("duplicate window length {0}")]
    DuplicateWindow(usize),

    #[error("band percentage must be in [0, 1) (got {0})")]
    InvalidBand(f64),

    #[error("scalar map has no entry for score {score}")]
    MissingScalar { score: usize },

    #[error("scalar for score {score} must be in [0, 1] (got {value})")]
    InvalidScalar { score: usize, value: f64 },

    #[error("scalar map entry for score {score} is unreachable with {windows} windows")]
    UnreachableScore { score: usize, windows: usize },

    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// One asset of the basket and its strategic (maximum) weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    pub base_weight: f64,
}

impl AssetConfig {
    pub fn new(symbol: impl Into<String>, base_weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            base_weight,
        }
    }
}

/// Complete, immutable strategy configuration.
///
/// Field order matters for TOML output: plain values first, tables last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_band_pct")]
    pub band_pct: f64,
    pub windows: Vec<usize>,
    pub assets: Vec<AssetConfig>,
    /// Score (number of ON windows) → fraction of base weight to allocate.
    #[serde(with = "score_keys")]
    pub scalar_map: BTreeMap<usize, f64>,
}

fn default_name() -> String {
    "Independent-Hysteresis-TAA".to_string()
}

fn default_band_pct() -> f64 {
    DEFAULT_BAND_PCT
}

impl StrategyConfig {
    /// The reference three-asset configuration.
    pub fn reference() -> Self {
        Self {
            name: default_name(),
            band_pct: DEFAULT_BAND_PCT,
            windows: vec![20, 120, 200],
            assets: vec![
                AssetConfig::new("QQQ", 0.45),
                AssetConfig::new("TLT", 0.35),
                AssetConfig::new("GLD", 0.20),
            ],
            scalar_map: BTreeMap::from([(0, 0.0), (1, 0.50), (2, 0.75), (3, 1.0)]),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Copy of this configuration with a different band percentage.
    pub fn with_band_pct(&self, band_pct: f64) -> Self {
        Self {
            band_pct,
            ..self.clone()
        }
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.symbol.as_str()).collect()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Largest window length (0 for an empty window list).
    pub fn max_window(&self) -> usize {
        self.windows.iter().copied().max().unwrap_or(0)
    }

    pub fn total_base_weight(&self) -> f64 {
        self.assets.iter().map(|a| a.base_weight).sum()
    }

    /// Check every startup invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.symbol.as_str()) {
                return Err(ConfigError::DuplicateAsset(asset.symbol.clone()));
            }
            if !asset.base_weight.is_finite() || asset.base_weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    symbol: asset.symbol.clone(),
                    weight: asset.base_weight,
                });
            }
        }
        let sum = self.total_base_weight();
        if sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsExceedOne { sum });
        }

        if self.windows.is_empty() {
            return Err(ConfigError::NoWindows);
        }
        let mut seen_windows = HashSet::new();
        for &w in &self.windows {
            if w == 0 {
                return Err(ConfigError::ZeroWindow);
            }
            if !seen_windows.insert(w) {
                return Err(ConfigError::DuplicateWindow(w));
            }
        }

        if !(0.0..1.0).contains(&self.band_pct) {
            return Err(ConfigError::InvalidBand(self.band_pct));
        }

        let windows = self.window_count();
        for score in 0..=windows {
            let value = *self
                .scalar_map
                .get(&score)
                .ok_or(ConfigError::MissingScalar { score })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidScalar { score, value });
            }
        }
        if let Some(&score) = self.scalar_map.keys().find(|&&s| s > windows) {
            return Err(ConfigError::UnreachableScore { score, windows });
        }

        Ok(())
    }

    /// Deterministic BLAKE3 fingerprint of the configuration (first 16 hex chars).
    ///
    /// Canonical JSON: struct field order is fixed and the scalar map is a BTreeMap.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("StrategyConfig must serialize");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex()[..16].to_string()
    }
}

/// TOML and JSON table keys are strings; scores are integers.
mod score_keys {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(map: &BTreeMap<usize, f64>, s: S) -> Result<S::Ok, S::Error> {
        let keyed: BTreeMap<String, f64> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        keyed.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<usize, f64>, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(d)?;
        raw.into_iter()
            .map(|(key, value)| {
                key.trim()
                    .parse::<usize>()
                    .map(|score| (score, value))
                    .map_err(|_| {
                        D::Error::custom(format!("score key '{key}' is not a non-negative integer"))
                    })
            })
            .collect()
    }
}
