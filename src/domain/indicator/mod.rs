//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Warm-up points carry `None`; consumers must skip them rather than read a
//! placeholder value.

pub mod bollinger;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

/// Denominator used for the rolling variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StddevKind {
    /// Divide by N-1.
    #[default]
    Sample,
    /// Divide by N.
    Population,
}

impl StddevKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sample" => Some(StddevKind::Sample),
            "population" => Some(StddevKind::Population),
            _ => None,
        }
    }

    /// Smallest window for which the estimator is defined.
    pub fn min_period(self) -> usize {
        match self {
            StddevKind::Sample => 2,
            StddevKind::Population => 1,
        }
    }
}

impl fmt::Display for StddevKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StddevKind::Sample => write!(f, "sample"),
            StddevKind::Population => write!(f, "population"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Stddev {
        period: usize,
        kind: StddevKind,
    },
    Bollinger {
        period: usize,
        num_std_dev: f64,
        kind: StddevKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar value at `index`, `None` during warm-up or past the end.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            IndicatorValue::Bollinger { .. } => None,
        }
    }

    /// First index with a defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(IndicatorPoint::is_defined)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Stddev { period, kind } => write!(f, "STDDEV({},{})", period, kind),
            IndicatorType::Bollinger {
                period,
                num_std_dev,
                kind,
            } => write!(f, "BOLLINGER({},{},{})", period, num_std_dev, kind),
        }
    }
}
