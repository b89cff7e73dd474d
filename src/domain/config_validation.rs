//! Configuration validation.
//!
//! Validates all config fields before a run starts. The `read_*` helpers are
//! shared with the CLI builders so a value is parsed the same way in both.

use crate::domain::error::TradesimError;
use crate::domain::execution::GainAccounting;
use crate::domain::indicator::StddevKind;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_BALANCE: f64 = 100_000.0;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    read_data_format(config)?;
    let start = read_date(config, "data", "start_date")?;
    let end = read_date(config, "data", "end_date")?;

    if matches!((start, end), (Some(s), Some(e)) if s > e) {
        return Err(TradesimError::config_invalid(
            "data",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    read_positive_float(config, "backtest", "initial_balance", DEFAULT_INITIAL_BALANCE)?;
    read_gain_accounting(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match read_strategy_kind(config)?.as_str() {
        StrategyParams::SMA_CROSSOVER => {
            let short = read_positive_int(config, "strategy", "short_window", 50)?;
            let long = read_positive_int(config, "strategy", "long_window", 200)?;
            if short >= long {
                return Err(TradesimError::config_invalid(
                    "strategy",
                    "short_window",
                    "short_window must be less than long_window",
                ));
            }
        }
        _ => {
            let kind = read_stddev_kind(config)?;
            let window = read_positive_int(config, "strategy", "window", 20)?;
            if window < kind.min_period() {
                return Err(TradesimError::config_invalid(
                    "strategy",
                    "window",
                    format!("{kind} standard deviation needs a window of at least {}", kind.min_period()),
                ));
            }
            read_positive_float(config, "strategy", "num_std_dev", 2.0)?;
        }
    }
    Ok(())
}

pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    read_int_list(config, "sweep", "short_windows")?;
    read_int_list(config, "sweep", "long_windows")?;
    read_int_list(config, "sweep", "windows")?;
    read_float_list(config, "sweep", "num_std_devs")?;
    Ok(())
}

/// Everything a backtest run needs.
pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_data_config(config)?;
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    Ok(())
}

pub fn read_strategy_kind(config: &dyn ConfigPort) -> Result<String, TradesimError> {
    let value = non_empty(config, "strategy", "kind").ok_or_else(|| TradesimError::ConfigMissing {
        section: "strategy".to_string(),
        key: "kind".to_string(),
    })?;
    let kind = value.to_lowercase();
    match kind.as_str() {
        StrategyParams::SMA_CROSSOVER | StrategyParams::BOLLINGER => Ok(kind),
        _ => Err(TradesimError::config_invalid(
            "strategy",
            "kind",
            format!(
                "unknown strategy '{value}', expected {} or {}",
                StrategyParams::SMA_CROSSOVER,
                StrategyParams::BOLLINGER
            ),
        )),
    }
}

pub fn read_stddev_kind(config: &dyn ConfigPort) -> Result<StddevKind, TradesimError> {
    match non_empty(config, "strategy", "stddev") {
        None => Ok(StddevKind::default()),
        Some(s) => StddevKind::parse(&s).ok_or_else(|| {
            TradesimError::config_invalid("strategy", "stddev", "expected sample or population")
        }),
    }
}

pub fn read_gain_accounting(config: &dyn ConfigPort) -> Result<GainAccounting, TradesimError> {
    match non_empty(config, "backtest", "gain_accounting") {
        None => Ok(GainAccounting::default()),
        Some(s) => GainAccounting::parse(&s).ok_or_else(|| {
            TradesimError::config_invalid("backtest", "gain_accounting", "expected zero or cost_basis")
        }),
    }
}

/// Bar file format under `[data] format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Json,
    Csv,
}

pub fn read_data_format(config: &dyn ConfigPort) -> Result<DataFormat, TradesimError> {
    match non_empty(config, "data", "format").map(|s| s.to_lowercase()).as_deref() {
        None | Some("json") => Ok(DataFormat::Json),
        Some("csv") => Ok(DataFormat::Csv),
        Some(_) => Err(TradesimError::config_invalid("data", "format", "expected json or csv")),
    }
}

pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, TradesimError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TradesimError::config_invalid(
                    section,
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

/// Positive integer, or `default` when the key is absent.
pub fn read_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TradesimError> {
    match non_empty(config, section, key) {
        None => Ok(default),
        Some(s) => parse_positive_int(&s)
            .ok_or_else(|| TradesimError::config_invalid(section, key, format!("{key} must be a positive integer"))),
    }
}

/// Positive finite number, or `default` when the key is absent.
pub fn read_positive_float(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TradesimError> {
    match non_empty(config, section, key) {
        None => Ok(default),
        Some(s) => parse_positive_float(&s)
            .ok_or_else(|| TradesimError::config_invalid(section, key, format!("{key} must be positive"))),
    }
}

/// Comma-separated positive integers; absent means empty.
pub fn read_int_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Vec<usize>, TradesimError> {
    read_list(config, section, key, parse_positive_int)
}

pub fn read_float_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Vec<f64>, TradesimError> {
    read_list(config, section, key, parse_positive_float)
}

fn read_list<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<T>, TradesimError> {
    let Some(raw) = non_empty(config, section, key) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse(s).ok_or_else(|| {
                TradesimError::config_invalid(section, key, format!("'{s}' is not a positive number"))
            })
        })
        .collect()
}

fn parse_positive_int(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().filter(|v| *v > 0)
}

fn parse_positive_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
