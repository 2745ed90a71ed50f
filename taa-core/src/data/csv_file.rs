//! Offline price import from a wide CSV file.
//!
//! Layout: a `date` column (`YYYY-MM-DD`) followed by one close column per
//! symbol. Empty cells are gaps.
//!
//! ```text
//! date,QQQ,TLT,GLD
//! 2024-01-02,402.5,97.1,190.2
//! 2024-01-03,398.1,,191.0
//! ```

use super::provider::{ClosePoint, DataError, PriceProvider};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// A CSV price table held in memory.
#[derive(Debug, Clone)]
pub struct CsvPriceFile {
    series: BTreeMap<String, Vec<ClosePoint>>,
}

impl CsvPriceFile {
    pub fn open(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut columns = headers.iter();
        match columns.next() {
            Some(first) if first.eq_ignore_ascii_case("date") => {}
            _ => return Err(DataError::Csv("first column must be 'date'".into())),
        }
        let symbols: Vec<String> = columns.map(str::to_string).collect();
        if symbols.is_empty() {
            return Err(DataError::Csv("no symbol columns".into()));
        }

        let mut series: BTreeMap<String, Vec<ClosePoint>> =
            symbols.iter().map(|s| (s.clone(), Vec::new())).collect();

        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                DataError::Csv(format!("row {}: invalid date '{raw_date}': {e}", row + 1))
            })?;
            for (symbol, cell) in symbols.iter().zip(record.iter().skip(1)) {
                if cell.is_empty() {
                    continue;
                }
                let close: f64 = cell.parse().map_err(|_| {
                    DataError::Csv(format!("row {}: invalid close '{cell}' for {symbol}", row + 1))
                })?;
                if let Some(points) = series.get_mut(symbol) {
                    points.push(ClosePoint::new(date, close));
                }
            }
        }

        Ok(Self { series })
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }
}

impl PriceProvider for CsvPriceFile {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePoint>, DataError> {
        let points = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        let mut selected: Vec<ClosePoint> = points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        selected.sort_by_key(|p| p.date);
        Ok(selected)
    }
}
