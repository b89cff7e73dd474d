//! Backtest engine: a single forward pass over the bar series.
//!
//! [`simulate`] is pure: every call builds its own [`Account`] and ledger, so
//! independent runs may execute in parallel.

use tracing::{debug, warn};

use super::error::TradesimError;
use super::execution::{enter_long, exit_long, EntryResult, GainAccounting};
use super::indicator_helpers::{compute_indicators, IndicatorSet};
use super::ledger::{TradeAction, TradeRecord};
use super::metrics::SummaryMetrics;
use super::ohlcv::{closes, validate_bars, OhlcvBar};
use super::portfolio::Account;
use super::signal::{derive_signals, derive_transitions, policy_for, Signal, SignalPolicy, Transition};
use super::strategy::StrategyParams;

/// Immutable per-run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Ledger label only.
    pub symbol: String,
    pub initial_balance: f64,
    pub gain_accounting: GainAccounting,
}

impl RunConfig {
    pub fn new(symbol: impl Into<String>, initial_balance: f64) -> Self {
        RunConfig {
            symbol: symbol.into(),
            initial_balance,
            gain_accounting: GainAccounting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ledger: Vec<TradeRecord>,
    pub metrics: SummaryMetrics,
    pub signals: Vec<Signal>,
    pub account: Account,
}

/// Compute indicators for `params` and simulate.
pub fn run_backtest(
    bars: &[OhlcvBar],
    params: &StrategyParams,
    config: &RunConfig,
) -> Result<BacktestResult, TradesimError> {
    let indicators = compute_indicators(bars, params);
    let policy = policy_for(params);
    simulate(bars, &indicators, policy.as_ref(), config)
}

pub fn simulate(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    policy: &dyn SignalPolicy,
    config: &RunConfig,
) -> Result<BacktestResult, TradesimError> {
    if !config.initial_balance.is_finite() || config.initial_balance <= 0.0 {
        return Err(TradesimError::config_invalid(
            "backtest",
            "initial_balance",
            format!("must be a positive number, got {}", config.initial_balance),
        ));
    }
    validate_bars(bars)?;
    if indicators.len() != bars.len() {
        return Err(TradesimError::InvalidInput {
            index: indicators.len().min(bars.len()),
            reason: format!(
                "indicator length {} does not match {} bars",
                indicators.len(),
                bars.len()
            ),
        });
    }

    if bars.len() <= policy.warmup() || !indicators.any_defined() {
        warn!(
            symbol = %config.symbol,
            bars = bars.len(),
            warmup = policy.warmup(),
            "insufficient data: {} never signals, run is a no-op",
            policy.name()
        );
    }

    let prices = closes(bars);
    let signals = derive_signals(policy, &prices, indicators);
    let transitions = derive_transitions(&signals);

    let mut account = Account::new(config.initial_balance);
    let mut ledger: Vec<TradeRecord> = Vec::new();

    for (bar, transition) in bars.iter().zip(&transitions) {
        match transition {
            Transition::Enter => match enter_long(&mut account, bar.close) {
                EntryResult::Entered { shares, price, cost } => {
                    debug!(date = %bar.date, shares, price, "buy");
                    ledger.push(TradeRecord {
                        date: bar.date,
                        symbol: config.symbol.clone(),
                        action: TradeAction::Buy,
                        price,
                        shares,
                        transaction_amount: cost,
                        realized_gain_loss: 0.0,
                        balance_after: account.cash,
                    });
                }
                EntryResult::InsufficientFunds => {
                    debug!(
                        date = %bar.date,
                        cash = account.cash,
                        price = bar.close,
                        "entry skipped: cash below one share"
                    );
                }
            },
            Transition::Exit => {
                let entry_price = account.average_entry_price();
                if let Some(exit) = exit_long(&mut account, bar.close, config.gain_accounting) {
                    debug!(
                        date = %bar.date,
                        shares = exit.shares,
                        price = exit.price,
                        entry_price,
                        "sell"
                    );
                    ledger.push(TradeRecord {
                        date: bar.date,
                        symbol: config.symbol.clone(),
                        action: TradeAction::Sell,
                        price: exit.price,
                        shares: exit.shares,
                        transaction_amount: exit.proceeds,
                        realized_gain_loss: exit.realized_gain_loss,
                        balance_after: account.cash,
                    });
                }
            }
            Transition::None => {}
        }
    }

    let first = &bars[0];
    let last = &bars[bars.len() - 1];
    debug!(
        date = %last.date,
        equity = account.equity(last.close),
        holding = account.is_holding(),
        "end of data"
    );

    if let Some(exit) = exit_long(&mut account, last.close, config.gain_accounting) {
        debug!(date = %last.date, shares = exit.shares, price = exit.price, "end-of-data liquidation");
        ledger.push(TradeRecord {
            date: last.date,
            symbol: config.symbol.clone(),
            action: TradeAction::SellEod,
            price: exit.price,
            shares: exit.shares,
            transaction_amount: exit.proceeds,
            realized_gain_loss: exit.realized_gain_loss,
            balance_after: account.cash,
        });
    }

    let metrics = SummaryMetrics::compute(
        account.initial_balance,
        account.cash,
        first.date,
        last.date,
        &ledger,
    )?;

    Ok(BacktestResult {
        ledger,
        metrics,
        signals,
        account,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::StddevKind;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar::from_close(start + chrono::Duration::days(i as i64), close))
            .collect()
    }

    fn crossover(short_window: usize, long_window: usize) -> StrategyParams {
        StrategyParams::SmaCrossover {
            short_window,
            long_window,
        }
    }

    #[test]
    fn run_config_defaults_to_zero_gain_accounting() {
        let config = RunConfig::new("FNGU", 100_000.0);
        assert_eq!(config.symbol, "FNGU");
        assert_eq!(config.gain_accounting, GainAccounting::Zero);
    }

    #[test]
    fn rising_then_falling_prices_round_trip() {
        // short SMA crosses above at bar 2 and below at bar 6
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 9.0, 6.0, 3.0, 2.0];
        let bars = make_bars(&prices);
        let result = run_backtest(&bars, &crossover(2, 3), &RunConfig::new("T", 1_000.0)).unwrap();

        assert_eq!(result.ledger.len(), 2);
        let buy = &result.ledger[0];
        let sell = &result.ledger[1];

        assert_eq!(buy.action, TradeAction::Buy);
        assert_eq!(buy.date, bars[2].date);
        assert_eq!(buy.shares, 83);
        assert!((buy.transaction_amount - 996.0).abs() < 1e-9);
        assert!((buy.balance_after - 4.0).abs() < 1e-9);
        assert_eq!(buy.realized_gain_loss, 0.0);

        assert_eq!(sell.action, TradeAction::Sell);
        assert_eq!(sell.date, bars[6].date);
        assert_eq!(sell.shares, 83);
        assert!((sell.transaction_amount - 747.0).abs() < 1e-9);
        assert_eq!(sell.realized_gain_loss, 0.0);
        assert!((sell.balance_after - 751.0).abs() < 1e-9);

        assert_eq!(result.account.shares, 0);
        assert!((result.metrics.final_balance - 751.0).abs() < 1e-9);
        assert!((result.metrics.total_gain_loss - (-249.0)).abs() < 1e-9);
    }

    #[test]
    fn cost_basis_accounting_reports_loss() {
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 9.0, 6.0, 3.0, 2.0];
        let bars = make_bars(&prices);
        let config = RunConfig {
            gain_accounting: GainAccounting::CostBasis,
            ..RunConfig::new("T", 1_000.0)
        };
        let result = run_backtest(&bars, &crossover(2, 3), &config).unwrap();

        assert!((result.ledger[1].realized_gain_loss - (-249.0)).abs() < 1e-9);
        assert!((result.metrics.final_balance - 751.0).abs() < 1e-9);
    }

    #[test]
    fn open_position_is_liquidated_at_end() {
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let bars = make_bars(&prices);
        let result = run_backtest(&bars, &crossover(2, 3), &RunConfig::new("T", 1_000.0)).unwrap();

        let last = result.ledger.last().unwrap();
        assert_eq!(last.action, TradeAction::SellEod);
        assert_eq!(last.date, bars[5].date);
        assert!((last.price - 15.0).abs() < f64::EPSILON);
        assert_eq!(result.account.shares, 0);
    }

    #[test]
    fn window_longer_than_series_is_noop() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let result = run_backtest(
            &bars,
            &StrategyParams::default_bollinger(),
            &RunConfig::new("T", 5_000.0),
        )
        .unwrap();

        assert!(result.ledger.is_empty());
        assert_eq!(result.metrics.final_balance, 5_000.0);
        assert_eq!(result.metrics.total_return_pct, 0.0);
    }

    #[test]
    fn mismatched_indicator_length_is_rejected() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let params = crossover(1, 2);
        let indicators = compute_indicators(&bars[..2], &params);
        let policy = policy_for(&params);

        let err = simulate(&bars, &indicators, policy.as_ref(), &RunConfig::new("T", 100.0))
            .unwrap_err();
        assert!(matches!(err, TradesimError::InvalidInput { .. }));
    }

    #[test]
    fn unsorted_bars_are_rejected() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0]);
        bars.swap(0, 2);
        let err = run_backtest(&bars, &crossover(1, 2), &RunConfig::new("T", 100.0)).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn band_jump_from_long_to_above_upper_band_sells() {
        let mut prices = vec![100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0];
        prices.push(70.0); // below lower band
        prices.push(200.0); // straight above upper band
        let bars = make_bars(&prices);
        let params = StrategyParams::Bollinger {
            window: 10,
            num_std_dev: 1.0,
            stddev: StddevKind::Sample,
        };
        let result = run_backtest(&bars, &params, &RunConfig::new("T", 10_000.0)).unwrap();

        assert_eq!(result.signals[10], Signal::Long);
        assert_eq!(result.signals[11], Signal::Exit);
        assert_eq!(result.ledger.len(), 2);
        assert_eq!(result.ledger[0].action, TradeAction::Buy);
        assert_eq!(result.ledger[0].date, bars[10].date);
        assert_eq!(result.ledger[1].action, TradeAction::Sell);
        assert_eq!(result.ledger[1].date, bars[11].date);
        assert!((result.ledger[1].price - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_positive_initial_balance_is_rejected() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        for balance in [0.0, -500.0, f64::NAN, f64::INFINITY] {
            let err = run_backtest(&bars, &crossover(1, 2), &RunConfig::new("T", balance)).unwrap_err();
            assert!(
                matches!(err, TradesimError::ConfigInvalid { ref key, .. } if key == "initial_balance"),
                "balance {balance} gave {err:?}"
            );
        }
    }

    #[test]
    fn band_return_inside_after_upper_breach_buys() {
        let prices = [100.0, 101.0, 99.0, 100.0, 101.0, 130.0, 110.0, 111.0];
        let bars = make_bars(&prices);
        let params = StrategyParams::Bollinger {
            window: 5,
            num_std_dev: 1.0,
            stddev: StddevKind::Sample,
        };
        let result = run_backtest(&bars, &params, &RunConfig::new("T", 10_000.0)).unwrap();

        let codes: Vec<i8> = result.signals.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![0, 0, 0, 0, 0, -1, 0, 0]);

        assert_eq!(result.ledger.len(), 2);
        let buy = &result.ledger[0];
        assert_eq!(buy.action, TradeAction::Buy);
        assert_eq!(buy.date, bars[6].date);
        assert_eq!(buy.shares, 90);
        assert!((buy.balance_after - 100.0).abs() < 1e-9);

        let eod = &result.ledger[1];
        assert_eq!(eod.action, TradeAction::SellEod);
        assert_eq!(eod.date, bars[7].date);
        assert!((eod.price - 111.0).abs() < f64::EPSILON);
        assert!((result.metrics.final_balance - 10_090.0).abs() < 1e-9);
    }
}
