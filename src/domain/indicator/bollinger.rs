//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is computed over the same window as the middle band, with either
//! the sample (N-1) or population (N) denominator.
//!
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::stddev::window_mean_stddev;
use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, StddevKind,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    num_std_dev: f64,
    kind: StddevKind,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let defined = period >= kind.min_period();

    for i in 0..bars.len() {
        let value = if defined && i + 1 >= period {
            let (middle, stddev) = window_mean_stddev(&bars[i + 1 - period..=i], kind);
            let offset = num_std_dev * stddev;
            Some(IndicatorValue::Bollinger {
                upper: middle + offset,
                middle,
                lower: middle - offset,
            })
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            num_std_dev,
            kind,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                OhlcvBar::from_close(NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(), close)
            })
            .collect()
    }

    fn bands(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (upper, middle, lower),
            other => panic!("Expected Bollinger value, got {:?}", other),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0, StddevKind::Sample);

        assert!(!series.values[0].is_defined());
        assert!(!series.values[1].is_defined());
        assert!(series.values[2].is_defined());
        assert!(series.values[3].is_defined());
        assert!(series.values[4].is_defined());
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let series = calculate_bollinger(&bars, 3, 2.0, StddevKind::Sample);

        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 100.0).abs() < f64::EPSILON);
        assert!((upper - 100.0).abs() < f64::EPSILON);
        assert!((lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_sample_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0, StddevKind::Sample);

        // sample stddev of 10,20,30 is exactly 10
        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - 40.0).abs() < 1e-10);
        assert!((lower - 0.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_population_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 1.0, StddevKind::Population);

        let stddev = (200.0_f64 / 3.0).sqrt();
        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - (20.0 + stddev)).abs() < 1e-10);
        assert!((lower - (20.0 - stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = make_bars(&[10.0, 12.0, 9.0, 14.0, 11.0]);
        let series = calculate_bollinger(&bars, 4, 2.5, StddevKind::Sample);

        for i in 3..5 {
            let (upper, middle, lower) = bands(&series, i);
            assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
        }
    }

    #[test]
    fn bollinger_is_reproducible() {
        let bars = make_bars(&[10.0, 12.0, 9.0, 14.0, 11.0, 13.5, 8.25]);
        let a = calculate_bollinger(&bars, 3, 2.0, StddevKind::Sample);
        let b = calculate_bollinger(&bars, 3, 2.0, StddevKind::Sample);
        assert_eq!(a, b);
    }

    #[test]
    fn bollinger_indicator_type() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 20, 2.0, StddevKind::Population);

        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                num_std_dev: 2.0,
                kind: StddevKind::Population,
            }
        );
    }
}
