//! Rolling Standard Deviation indicator.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / d)
//! where d is n (population) or n-1 (sample).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, StddevKind,
};
use crate::domain::ohlcv::OhlcvBar;

/// Mean and standard deviation of one trailing window.
pub(crate) fn window_mean_stddev(window: &[OhlcvBar], kind: StddevKind) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().map(|b| b.close).sum::<f64>() / n;

    let sum_sq: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum();

    let denom = match kind {
        StddevKind::Sample => n - 1.0,
        StddevKind::Population => n,
    };

    (mean, (sum_sq / denom).sqrt())
}

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize, kind: StddevKind) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let defined = period >= kind.min_period();

    for i in 0..bars.len() {
        let value = if defined && i + 1 >= period {
            let (_, sd) = window_mean_stddev(&bars[i + 1 - period..=i], kind);
            Some(IndicatorValue::Simple(sd))
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev { period, kind },
        values,
    }
}
