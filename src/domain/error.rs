//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("invalid input at bar {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("annualized return undefined: first and last bar share the date {date}")]
    AnnualizationUndefined { date: NaiveDate },

    #[error("annualized return overflows: {total_return_pct:.2}% over {trading_days} days")]
    AnnualizationOverflow {
        total_return_pct: f64,
        trading_days: i64,
    },

    #[error("ledger write error: {reason}")]
    Ledger { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TradesimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) | TradesimError::Ledger { .. } => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::DataSource { .. } => 3,
            TradesimError::NoData { .. } | TradesimError::InvalidInput { .. } => 5,
            TradesimError::AnnualizationUndefined { .. }
            | TradesimError::AnnualizationOverflow { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
