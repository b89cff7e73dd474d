//! CSV file data adapter.
//!
//! Reads `{base_path}/{SYMBOL}.csv` with a `date,open,high,low,close,volume`
//! header. Only `date` and `close` are required; missing prices fall back to
//! the close.

use crate::adapters::{filter_and_sort, parse_bar_date, symbols_with_suffix};
use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const SUFFIX: &str = ".csv";

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(default, alias = "Open")]
    open: Option<f64>,
    #[serde(default, alias = "High")]
    high: Option<f64>,
    #[serde(default, alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Volume")]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_bar(self) -> Result<OhlcvBar, TradesimError> {
        let date = parse_bar_date(&self.date)?;
        Ok(OhlcvBar {
            date,
            open: self.open.unwrap_or(self.close),
            high: self.high.unwrap_or(self.close),
            low: self.low.unwrap_or(self.close),
            close: self.close,
            volume: self.volume.unwrap_or(0.0) as i64,
        })
    }
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", symbol, SUFFIX))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TradesimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradesimError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| TradesimError::DataSource {
                reason: format!("CSV parse error in {} row {}: {}", path.display(), line + 1, e),
            })?;
            bars.push(row.into_bar()?);
        }

        let bars = filter_and_sort(bars, start, end);
        debug!(symbol, path = %path.display(), bars = bars.len(), "loaded csv bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        symbols_with_suffix(&self.base_path, SUFFIX)
    }
}
