//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_ledger_adapter;
pub mod file_config_adapter;
pub mod json_adapter;

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
pub(crate) fn parse_bar_date(value: &str) -> Result<NaiveDate, TradesimError> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| TradesimError::DataSource {
        reason: format!("invalid date '{}': {}", value, e),
    })
}

/// Keep bars inside the inclusive range and sort them by date.
pub(crate) fn filter_and_sort(
    mut bars: Vec<OhlcvBar>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<OhlcvBar> {
    bars.retain(|b| start.is_none_or(|s| b.date >= s) && end.is_none_or(|e| b.date <= e));
    bars.sort_by_key(|b| b.date);
    bars
}

/// Symbols with a `{SYMBOL}{suffix}` file in `dir`, sorted.
pub(crate) fn symbols_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<String>, TradesimError> {
    let entries = fs::read_dir(dir).map_err(|e| TradesimError::DataSource {
        reason: format!("failed to read directory {}: {}", dir.display(), e),
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TradesimError::DataSource {
            reason: format!("directory entry error: {}", e),
        })?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(symbol) = name.strip_suffix(suffix) {
            if !symbol.is_empty() {
                symbols.push(symbol.to_string());
            }
        }
    }

    symbols.sort();
    Ok(symbols)
}
