//! Indicator bundles consumed by the signal policies.

use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyParams;

/// Band values at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Per-bar indicators for one strategy variant.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSet {
    Crossover {
        short: IndicatorSeries,
        long: IndicatorSeries,
    },
    Bands(IndicatorSeries),
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        match self {
            IndicatorSet::Crossover { short, .. } => short.len(),
            IndicatorSet::Bands(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (short, long) averages at `index`, present only once both are defined.
    pub fn moving_averages(&self, index: usize) -> Option<(f64, f64)> {
        match self {
            IndicatorSet::Crossover { short, long } => {
                Some((short.simple_at(index)?, long.simple_at(index)?))
            }
            IndicatorSet::Bands(_) => None,
        }
    }

    pub fn bands(&self, index: usize) -> Option<Bands> {
        match self {
            IndicatorSet::Bands(series) => match series.values.get(index)?.value? {
                IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                } => Some(Bands {
                    upper,
                    middle,
                    lower,
                }),
                IndicatorValue::Simple(_) => None,
            },
            IndicatorSet::Crossover { .. } => None,
        }
    }

    /// True when at least one bar has every indicator of the set defined.
    pub fn any_defined(&self) -> bool {
        (0..self.len()).any(|i| match self {
            IndicatorSet::Crossover { .. } => self.moving_averages(i).is_some(),
            IndicatorSet::Bands(_) => self.bands(i).is_some(),
        })
    }
}

pub fn compute_indicators(bars: &[OhlcvBar], params: &StrategyParams) -> IndicatorSet {
    match params {
        StrategyParams::SmaCrossover {
            short_window,
            long_window,
        } => IndicatorSet::Crossover {
            short: calculate_sma(bars, *short_window),
            long: calculate_sma(bars, *long_window),
        },
        StrategyParams::Bollinger {
            window,
            num_std_dev,
            stddev,
        } => IndicatorSet::Bands(calculate_bollinger(bars, *window, *num_std_dev, *stddev)),
    }
}
