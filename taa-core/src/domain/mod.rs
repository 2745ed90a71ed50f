//! Domain types: the aligned price history and the per-window trend state.

pub mod price_history;
pub mod state;

pub use price_history::{HistoryError, PriceHistory};
pub use state::WindowState;
