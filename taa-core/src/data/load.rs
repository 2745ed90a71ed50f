//! History loading: fetch every symbol, align, forward fill.

use super::align::align_and_fill;
use super::provider::{DataError, PriceProvider};
use crate::domain::PriceHistory;
use chrono::NaiveDate;
use tracing::info;

/// Fetch closes for `symbols` over `[start, end]` and build a `PriceHistory`
/// with columns in `symbols` order.
///
/// Any symbol coming back empty aborts the whole load: a history missing an
/// asset would silently zero its allocation.
pub fn load_history(
    provider: &dyn PriceProvider,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceHistory, DataError> {
    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        info!(provider = provider.name(), symbol, %start, %end, "fetching closes");
        let points = provider.fetch_closes(symbol, start, end)?;
        if points.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }
        info!(symbol, rows = points.len(), "closes fetched");
        series.push((symbol.to_string(), points));
    }

    let history = align_and_fill(series)?;
    info!(
        rows = history.len(),
        first = ?history.date(0),
        last = ?history.dates().last(),
        "price history aligned"
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::ClosePoint;
    use std::collections::HashMap;

    struct MockProvider {
        data: HashMap<String, Vec<ClosePoint>>,
    }

    impl PriceProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch_closes(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<ClosePoint>, DataError> {
            Ok(self.data.get(symbol).cloned().unwrap_or_default())
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn loads_in_requested_order() {
        let mut data = HashMap::new();
        data.insert("B".to_string(), vec![ClosePoint::new(d(1), 2.0)]);
        data.insert("A".to_string(), vec![ClosePoint::new(d(1), 1.0)]);
        let provider = MockProvider { data };

        let history = load_history(&provider, &["B", "A"], d(1), d(28)).unwrap();
        assert_eq!(history.symbols(), &["B".to_string(), "A".to_string()]);
        assert_eq!(history.close(1, 0), 1.0);
    }

    #[test]
    fn empty_symbol_aborts_load() {
        let mut data = HashMap::new();
        data.insert("A".to_string(), vec![ClosePoint::new(d(1), 1.0)]);
        let provider = MockProvider { data };

        let err = load_history(&provider, &["A", "B"], d(1), d(28)).unwrap_err();
        assert!(matches!(err, DataError::EmptyResult { symbol } if symbol == "B"));
    }
}
