//! Multi-symbol time alignment with forward fill.
//!
//! Given closes for several symbols, build one timeline (the union of all
//! dates). A symbol missing on a date takes its previous close; before its
//! first observation it stays absent.

use super::provider::{ClosePoint, DataError};
use crate::domain::PriceHistory;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Align `(symbol, closes)` pairs onto a common timeline, in the given symbol order.
///
/// NaN closes from a provider are treated as gaps.
pub fn align_and_fill(series: Vec<(String, Vec<ClosePoint>)>) -> Result<PriceHistory, DataError> {
    let mut all_dates = BTreeSet::new();
    for (_, points) in &series {
        for point in points {
            all_dates.insert(point.date);
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let mut symbols = Vec::with_capacity(series.len());
    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(series.len());
    for (symbol, points) in series {
        let by_date: HashMap<NaiveDate, f64> = points
            .into_iter()
            .filter(|p| !p.close.is_nan())
            .map(|p| (p.date, p.close))
            .collect();
        columns.push(dates.iter().map(|d| by_date.get(d).copied()).collect());
        symbols.push(symbol);
    }

    Ok(PriceHistory::from_gapped(dates, symbols, columns)?)
}
