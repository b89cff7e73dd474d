//! Daily OHLCV bar and series validation.

use chrono::NaiveDate;

use super::error::TradesimError;

/// One day's price observation. Only `date` and `close` drive the
/// simulation; the remaining fields are carried for adapters and reports.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// A bar carrying only a close price; open/high/low mirror the close.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        OhlcvBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Reject series the simulator cannot handle: empty input, dates that are
/// not strictly increasing, and closes that are non-positive or non-finite.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), TradesimError> {
    if bars.is_empty() {
        return Err(TradesimError::InvalidInput {
            index: 0,
            reason: "price series is empty".into(),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(TradesimError::InvalidInput {
                index: i,
                reason: format!("close must be positive and finite, got {}", bar.close),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(TradesimError::InvalidInput {
                index: i,
                reason: format!(
                    "dates must be strictly increasing: {} follows {}",
                    bar.date,
                    bars[i - 1].date
                ),
            });
        }
    }

    Ok(())
}

/// Closing prices in series order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
