//! WindowState — the ON/OFF trend state of one (asset, window) pair.

use serde::{Deserialize, Serialize};

/// Trend state of a single moving-average window.
///
/// This is the only piece of memory that survives from one trading day to the
/// next. Every replay starts with all windows `Off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowState {
    #[default]
    Off,
    On,
}

impl WindowState {
    pub fn is_on(self) -> bool {
        self == WindowState::On
    }

    pub fn from_bool(on: bool) -> Self {
        if on {
            WindowState::On
        } else {
            WindowState::Off
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindowState::On => "ON",
            WindowState::Off => "OFF",
        }
    }
}
