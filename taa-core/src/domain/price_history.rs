//! PriceHistory — aligned daily closes for a fixed basket of assets.
//!
//! Rows are trading dates in strictly increasing order. Each asset column holds
//! one close per row. Before an asset's first observation the close is NaN
//! (absent); from the first observation on, every row has a value, because
//! gaps are forward-filled when the history is built.
//!
//! A history is immutable once constructed. Live and backtest runs each own
//! one and hand out shared references only.

use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

/// Structural problems found while building a history.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    #[error("dates must be strictly increasing (row {index}: {date})")]
    NotIncreasing { index: usize, date: NaiveDate },

    #[error("column '{symbol}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("{columns} close columns for {symbols} symbols")]
    ColumnCountMismatch { symbols: usize, columns: usize },

    #[error("duplicate symbol '{0}'")]
    DuplicateSymbol(String),

    #[error("'{symbol}' has a gap on {date} after its first observation")]
    GapAfterInception { symbol: String, date: NaiveDate },

    #[error("'{symbol}' has a non-positive or non-finite close {close} on {date}")]
    InvalidClose {
        symbol: String,
        date: NaiveDate,
        close: f64,
    },
}

/// Aligned, forward-filled close prices.
///
/// Only built through `new` or `from_gapped`, which enforce the invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    /// One column per symbol, each `dates.len()` long.
    closes: Vec<Vec<f64>>,
}

impl PriceHistory {
    /// Build a history from already-filled columns. NaN marks "not yet listed".
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        closes: Vec<Vec<f64>>,
    ) -> Result<Self, HistoryError> {
        if symbols.len() != closes.len() {
            return Err(HistoryError::ColumnCountMismatch {
                symbols: symbols.len(),
                columns: closes.len(),
            });
        }

        for index in 1..dates.len() {
            if dates[index] <= dates[index - 1] {
                return Err(HistoryError::NotIncreasing {
                    index,
                    date: dates[index],
                });
            }
        }

        let mut seen = HashSet::new();
        for (symbol, column) in symbols.iter().zip(&closes) {
            if !seen.insert(symbol.as_str()) {
                return Err(HistoryError::DuplicateSymbol(symbol.clone()));
            }
            if column.len() != dates.len() {
                return Err(HistoryError::LengthMismatch {
                    symbol: symbol.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }

            let mut listed = false;
            for (&close, &date) in column.iter().zip(&dates) {
                if close.is_nan() {
                    if listed {
                        return Err(HistoryError::GapAfterInception {
                            symbol: symbol.clone(),
                            date,
                        });
                    }
                    continue;
                }
                if !close.is_finite() || close <= 0.0 {
                    return Err(HistoryError::InvalidClose {
                        symbol: symbol.clone(),
                        date,
                        close,
                    });
                }
                listed = true;
            }
        }

        Ok(Self {
            dates,
            symbols,
            closes,
        })
    }

    /// Build a history from columns with gaps, forward-filling each column
    /// from its first observation onward.
    pub fn from_gapped(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, HistoryError> {
        let closes = columns
            .into_iter()
            .map(|column| {
                let mut last = f64::NAN;
                column
                    .into_iter()
                    .map(|value| {
                        if let Some(v) = value.filter(|v| !v.is_nan()) {
                            last = v;
                        }
                        last
                    })
                    .collect()
            })
            .collect();
        Self::new(dates, symbols, closes)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn date(&self, day: usize) -> Option<NaiveDate> {
        self.dates.get(day).copied()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Column index of a symbol.
    pub fn column(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// All closes of one column.
    pub fn closes(&self, column: usize) -> &[f64] {
        &self.closes[column]
    }

    pub fn close(&self, column: usize, day: usize) -> f64 {
        self.closes[column][day]
    }

    /// Simple return from `day - 1` to `day`. None on the first row or when
    /// either close is absent.
    pub fn simple_return(&self, column: usize, day: usize) -> Option<f64> {
        if day == 0 || day >= self.len() {
            return None;
        }
        let prev = self.closes[column][day - 1];
        let curr = self.closes[column][day];
        if prev.is_nan() || curr.is_nan() {
            return None;
        }
        Some(curr / prev - 1.0)
    }

    /// Index of the first row dated on or after `date`.
    pub fn first_index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.dates.partition_point(|d| *d < date);
        (idx < self.len()).then_some(idx)
    }

    /// The first `len` rows. Used to check that nothing computed for a day
    /// changes when later rows are removed.
    pub fn truncated(&self, len: usize) -> PriceHistory {
        let len = len.min(self.len());
        PriceHistory {
            dates: self.dates[..len].to_vec(),
            symbols: self.symbols.clone(),
            closes: self.closes.iter().map(|c| c[..len].to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    #[test]
    fn forward_fills_after_first_observation() {
        let history = PriceHistory::from_gapped(
            vec![day(2), day(3), day(4), day(5)],
            vec!["A".into(), "B".into()],
            vec![
                vec![Some(10.0), None, Some(12.0), None],
                vec![None, Some(5.0), None, Some(6.0)],
            ],
        )
        .unwrap();

        assert_eq!(history.closes(0), &[10.0, 10.0, 12.0, 12.0]);
        let b = history.closes(1);
        assert!(b[0].is_nan());
        assert_eq!(&b[1..], &[5.0, 5.0, 6.0]);
    }

    #[test]
    fn rejects_non_increasing_dates() {
        let err = PriceHistory::new(
            vec![day(2), day(2)],
            vec!["A".into()],
            vec![vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, HistoryError::NotIncreasing { index: 1, .. }));
    }

    #[test]
    fn rejects_gap_after_inception() {
        let err = PriceHistory::new(
            vec![day(2), day(3), day(4)],
            vec!["A".into()],
            vec![vec![1.0, f64::NAN, 2.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            HistoryError::GapAfterInception {
                symbol: "A".into(),
                date: day(3)
            }
        );
    }

    #[test]
    fn rejects_duplicate_symbols_and_bad_lengths() {
        let dup = PriceHistory::new(
            vec![day(2)],
            vec!["A".into(), "A".into()],
            vec![vec![1.0], vec![1.0]],
        );
        assert!(matches!(dup, Err(HistoryError::DuplicateSymbol(_))));

        let short = PriceHistory::new(vec![day(2), day(3)], vec!["A".into()], vec![vec![1.0]]);
        assert!(matches!(short, Err(HistoryError::LengthMismatch { .. })));
    }

    #[test]
    fn rejects_non_positive_close() {
        let err = PriceHistory::new(vec![day(2)], vec!["A".into()], vec![vec![0.0]]);
        assert!(matches!(err, Err(HistoryError::InvalidClose { .. })));
    }

    #[test]
    fn simple_return_and_lookup() {
        let history = PriceHistory::new(
            vec![day(2), day(3), day(5)],
            vec!["A".into()],
            vec![vec![100.0, 110.0, 99.0]],
        )
        .unwrap();

        assert_eq!(history.simple_return(0, 0), None);
        assert!((history.simple_return(0, 1).unwrap() - 0.1).abs() < 1e-12);
        assert!((history.simple_return(0, 2).unwrap() + 0.1).abs() < 1e-12);

        assert_eq!(history.first_index_on_or_after(day(4)), Some(2));
        assert_eq!(history.first_index_on_or_after(day(1)), Some(0));
        assert_eq!(history.first_index_on_or_after(day(6)), None);
        assert_eq!(history.column("A"), Some(0));
        assert_eq!(history.column("Z"), None);
    }

    #[test]
    fn truncated_keeps_prefix() {
        let history = PriceHistory::new(
            vec![day(2), day(3), day(4)],
            vec!["A".into()],
            vec![vec![1.0, 2.0, 3.0]],
        )
        .unwrap();
        let prefix = history.truncated(2);
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix.closes(0), &[1.0, 2.0]);
        assert_eq!(history.truncated(10).len(), 3);
    }
}
