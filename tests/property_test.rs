//! Property tests for simulator invariants over random price paths.

mod common;

use common::*;
use proptest::prelude::*;
use tradesim::domain::backtest::{run_backtest, RunConfig};
use tradesim::domain::error::TradesimError;
use tradesim::domain::execution::GainAccounting;
use tradesim::domain::indicator::StddevKind;
use tradesim::domain::ledger::TradeAction;
use tradesim::domain::signal::{derive_transitions, Signal, Transition};
use tradesim::domain::strategy::StrategyParams;

/// Closes within a 2x band keep daily equity growth bounded, so the
/// annualized return stays finite.
fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0f64..100.0, 2..120)
}

fn params_strategy() -> impl Strategy<Value = StrategyParams> {
    prop_oneof![
        (1usize..15, 1usize..30).prop_map(|(a, b)| StrategyParams::SmaCrossover {
            short_window: a.min(b),
            long_window: a.max(b) + 1,
        }),
        (2usize..30, 0.5f64..3.0, any::<bool>()).prop_map(|(window, k, population)| {
            StrategyParams::Bollinger {
                window,
                num_std_dev: k,
                stddev: if population {
                    StddevKind::Population
                } else {
                    StddevKind::Sample
                },
            }
        }),
    ]
}

fn signal_strategy() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Flat), Just(Signal::Long), Just(Signal::Exit)]
}

proptest! {
    #[test]
    fn cash_never_negative_and_run_ends_flat(
        closes in closes_strategy(),
        params in params_strategy(),
        balance in 10.0f64..1_000_000.0,
    ) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let result = run_backtest(&bars, &params, &RunConfig::new("PROP", balance)).unwrap();

        prop_assert!(result.ledger.iter().all(|t| t.balance_after >= 0.0));
        prop_assert!(result.account.cash >= 0.0);
        prop_assert_eq!(result.account.shares, 0);
        prop_assert!((result.metrics.final_balance - result.account.cash).abs() < 1e-9);
    }

    #[test]
    fn ledger_never_sells_without_holding(
        closes in closes_strategy(),
        params in params_strategy(),
    ) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let result = run_backtest(&bars, &params, &RunConfig::new("PROP", 10_000.0)).unwrap();

        let mut held: u64 = 0;
        for trade in &result.ledger {
            match trade.action {
                TradeAction::Buy => {
                    prop_assert!(trade.shares > 0);
                    held += trade.shares;
                }
                TradeAction::Sell | TradeAction::SellEod => {
                    prop_assert_eq!(held, trade.shares);
                    held = 0;
                }
            }
        }
        prop_assert_eq!(held, 0);
    }

    #[test]
    fn ledger_is_in_date_order(
        closes in closes_strategy(),
        params in params_strategy(),
    ) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let result = run_backtest(&bars, &params, &RunConfig::new("PROP", 10_000.0)).unwrap();

        prop_assert!(result.ledger.windows(2).all(|w| w[0].date <= w[1].date));
        let eod: Vec<_> = result
            .ledger
            .iter()
            .enumerate()
            .filter(|(_, t)| t.action == TradeAction::SellEod)
            .collect();
        prop_assert!(eod.len() <= 1);
        if let Some((i, _)) = eod.first() {
            prop_assert_eq!(*i, result.ledger.len() - 1);
        }
    }

    #[test]
    fn runs_are_deterministic(
        closes in closes_strategy(),
        params in params_strategy(),
    ) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let config = RunConfig {
            gain_accounting: GainAccounting::CostBasis,
            ..RunConfig::new("PROP", 10_000.0)
        };
        let first = run_backtest(&bars, &params, &config).unwrap();
        let second = run_backtest(&bars, &params, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn nothing_before_warmup_trades(
        closes in closes_strategy(),
        window in 2usize..30,
    ) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let params = StrategyParams::Bollinger {
            window,
            num_std_dev: 1.0,
            stddev: StddevKind::Sample,
        };
        let result = run_backtest(&bars, &params, &RunConfig::new("PROP", 10_000.0)).unwrap();

        prop_assert!(result.signals.iter().take(window).all(|s| *s == Signal::Flat));
        for trade in result.ledger.iter().filter(|t| t.action != TradeAction::SellEod) {
            prop_assert!(trade.date >= bars[window.min(bars.len() - 1)].date);
        }
    }

    #[test]
    fn transitions_follow_table(signals in prop::collection::vec(signal_strategy(), 1..60)) {
        let transitions = derive_transitions(&signals);
        prop_assert_eq!(transitions.len(), signals.len());
        prop_assert_eq!(transitions[0], Transition::None);

        for i in 1..signals.len() {
            let expected = match (signals[i - 1], signals[i]) {
                (Signal::Flat | Signal::Exit, Signal::Long) | (Signal::Exit, Signal::Flat) => {
                    Transition::Enter
                }
                (Signal::Long, Signal::Flat | Signal::Exit) | (Signal::Flat, Signal::Exit) => {
                    Transition::Exit
                }
                _ => Transition::None,
            };
            prop_assert_eq!(transitions[i], expected);
        }
    }

    #[test]
    fn same_day_series_is_undefined(close in 1.0f64..500.0) {
        let bars = bars_from_closes("2020-01-01", &[close]);
        let err = run_backtest(&bars, &StrategyParams::default_bollinger(), &RunConfig::new("ONE", 1_000.0))
            .unwrap_err();
        let is_annualization = matches!(err, TradesimError::AnnualizationUndefined { .. });
        prop_assert!(is_annualization);
    }
}
