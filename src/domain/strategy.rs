//! Strategy selection and parameters.

use std::fmt;

use super::indicator::StddevKind;

/// Parameters of one of the supported signal rules.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParams {
    /// Long while the short SMA is above the long SMA.
    SmaCrossover {
        short_window: usize,
        long_window: usize,
    },
    /// Long below the lower band, flat again above the upper band.
    Bollinger {
        window: usize,
        num_std_dev: f64,
        stddev: StddevKind,
    },
}

impl StrategyParams {
    pub const SMA_CROSSOVER: &'static str = "sma_crossover";
    pub const BOLLINGER: &'static str = "bollinger";

    /// SMA(50) against SMA(200).
    pub fn default_crossover() -> Self {
        StrategyParams::SmaCrossover {
            short_window: 50,
            long_window: 200,
        }
    }

    /// 20-bar bands at two sample deviations.
    pub fn default_bollinger() -> Self {
        StrategyParams::Bollinger {
            window: 20,
            num_std_dev: 2.0,
            stddev: StddevKind::Sample,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StrategyParams::SmaCrossover { .. } => Self::SMA_CROSSOVER,
            StrategyParams::Bollinger { .. } => Self::BOLLINGER,
        }
    }

    /// Number of bars needed before any indicator the rule reads is defined.
    pub fn lookback(&self) -> usize {
        match self {
            StrategyParams::SmaCrossover {
                short_window,
                long_window,
            } => (*short_window).max(*long_window),
            StrategyParams::Bollinger { window, .. } => *window,
        }
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyParams::SmaCrossover {
                short_window,
                long_window,
            } => write!(f, "SMA crossover ({}/{})", short_window, long_window),
            StrategyParams::Bollinger {
                window,
                num_std_dev,
                stddev,
            } => write!(f, "Bollinger ({}, {}σ {})", window, num_std_dev, stddev),
        }
    }
}
