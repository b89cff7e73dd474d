//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod strategy;
pub mod signal;
pub mod portfolio;
pub mod execution;
pub mod ledger;
pub mod metrics;
pub mod backtest;
pub mod sweep;
pub mod config_validation;
pub mod error;
