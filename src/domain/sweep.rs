//! Parameter sweeps over a grid of strategy settings.
//!
//! Every grid point is an independent [`run_backtest`] call with its own
//! account, so the sweep runs on the rayon pool by default.

use rayon::prelude::*;
use tracing::info;

use super::backtest::{run_backtest, RunConfig};
use super::error::TradesimError;
use super::metrics::SummaryMetrics;
use super::ohlcv::OhlcvBar;
use super::strategy::StrategyParams;

/// Values to try for each parameter. An empty list keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
    pub windows: Vec<usize>,
    pub num_std_devs: Vec<f64>,
}

impl ParamGrid {
    /// Short 10/20/50 against long 100/200; windows 10/20/30 at 1.5/2/2.5σ.
    pub fn default_grid() -> Self {
        ParamGrid {
            short_windows: vec![10, 20, 50],
            long_windows: vec![100, 200],
            windows: vec![10, 20, 30],
            num_std_devs: vec![1.5, 2.0, 2.5],
        }
    }

    /// Expand the grid around `base`, which also fixes the strategy kind.
    /// Crossover pairs with `short >= long` are skipped.
    pub fn generate(&self, base: &StrategyParams) -> Vec<StrategyParams> {
        let mut params = Vec::new();

        match base {
            StrategyParams::SmaCrossover {
                short_window,
                long_window,
            } => {
                let shorts = or_base(&self.short_windows, *short_window);
                let longs = or_base(&self.long_windows, *long_window);
                for &short in &shorts {
                    for &long in &longs {
                        if short >= long {
                            continue;
                        }
                        params.push(StrategyParams::SmaCrossover {
                            short_window: short,
                            long_window: long,
                        });
                    }
                }
            }
            StrategyParams::Bollinger {
                window,
                num_std_dev,
                stddev,
            } => {
                let windows = or_base(&self.windows, *window);
                let devs = or_base(&self.num_std_devs, *num_std_dev);
                for &w in &windows {
                    for &k in &devs {
                        params.push(StrategyParams::Bollinger {
                            window: w,
                            num_std_dev: k,
                            stddev: *stddev,
                        });
                    }
                }
            }
        }

        params
    }
}

fn or_base<T: Copy>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub params: StrategyParams,
    pub metrics: SummaryMetrics,
}

/// Sweep results, best total return first; ties keep grid order.
#[derive(Debug, Clone, Default)]
pub struct SweepResults {
    entries: Vec<SweepEntry>,
}

impl SweepResults {
    fn new(mut entries: Vec<SweepEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.metrics
                .total_return_pct
                .total_cmp(&a.metrics.total_return_pct)
        });
        Self { entries }
    }

    pub fn all(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn top(&self, n: usize) -> &[SweepEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn sweep(
        &self,
        bars: &[OhlcvBar],
        grid: &ParamGrid,
        base: &StrategyParams,
        config: &RunConfig,
    ) -> Result<SweepResults, TradesimError> {
        let candidates = grid.generate(base);
        info!(
            runs = candidates.len(),
            parallel = self.parallel,
            kind = base.kind(),
            "starting sweep"
        );

        let run_one = |params: &StrategyParams| -> Result<SweepEntry, TradesimError> {
            let result = run_backtest(bars, params, config)?;
            Ok(SweepEntry {
                params: params.clone(),
                metrics: result.metrics,
            })
        };

        let entries: Vec<SweepEntry> = if self.parallel {
            candidates
                .par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            candidates
                .iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(entries))
    }
}
