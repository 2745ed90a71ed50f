//! Market-data boundary: providers, alignment, forward fill.
//!
//! Everything here runs before a replay starts. The engine only ever sees a
//! fully materialized `PriceHistory`.

pub mod align;
pub mod csv_file;
pub mod load;
pub mod provider;
pub mod yahoo;

pub use align::align_and_fill;
pub use csv_file::CsvPriceFile;
pub use load::load_history;
pub use provider::{ClosePoint, DataError, PriceProvider};
pub use yahoo::YahooProvider;
