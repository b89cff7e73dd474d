//! JSON file data adapter.
//!
//! Reads `{base_path}/{SYMBOL}_historical_data.json`: an array of records
//! with `Date`, `Open`, `High`, `Low`, `Close` and `Volume` fields.

use crate::adapters::{filter_and_sort, parse_bar_date, symbols_with_suffix};
use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const SUFFIX: &str = "_historical_data.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JsonBar {
    date: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

pub struct JsonAdapter {
    base_path: PathBuf,
}

impl JsonAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", symbol, SUFFIX))
    }
}

impl DataPort for JsonAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TradesimError> {
        let path = self.json_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradesimError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let records: Vec<JsonBar> =
            serde_json::from_str(&content).map_err(|e| TradesimError::DataSource {
                reason: format!("JSON parse error in {}: {}", path.display(), e),
            })?;

        let bars = records
            .into_iter()
            .map(|r| {
                Ok(OhlcvBar {
                    date: parse_bar_date(&r.date)?,
                    open: r.open.unwrap_or(r.close),
                    high: r.high.unwrap_or(r.close),
                    low: r.low.unwrap_or(r.close),
                    close: r.close,
                    volume: r.volume.unwrap_or(0.0) as i64,
                })
            })
            .collect::<Result<Vec<_>, TradesimError>>()?;

        let bars = filter_and_sort(bars, start, end);
        debug!(symbol, path = %path.display(), bars = bars.len(), "loaded json bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        symbols_with_suffix(&self.base_path, SUFFIX)
    }
}
