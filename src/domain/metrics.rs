//! Summary performance metrics.

use chrono::NaiveDate;

use super::error::TradesimError;
use super::ledger::TradeRecord;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total_gain_loss: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub final_balance: f64,
    /// Calendar days between the first and last bar.
    pub trading_days: i64,
    pub trade_count: usize,
    pub round_trips: usize,
}

impl SummaryMetrics {
    pub fn compute(
        initial_balance: f64,
        final_balance: f64,
        first_date: NaiveDate,
        last_date: NaiveDate,
        ledger: &[TradeRecord],
    ) -> Result<Self, TradesimError> {
        let total_gain_loss = final_balance - initial_balance;
        let total_return_pct = total_return_pct(initial_balance, final_balance);
        let trading_days = (last_date - first_date).num_days();

        if trading_days == 0 {
            return Err(TradesimError::AnnualizationUndefined { date: last_date });
        }
        let annualized_return_pct = annualized_return_pct(total_return_pct, trading_days);
        if !annualized_return_pct.is_finite() {
            return Err(TradesimError::AnnualizationOverflow {
                total_return_pct,
                trading_days,
            });
        }

        Ok(SummaryMetrics {
            total_gain_loss,
            total_return_pct,
            annualized_return_pct,
            final_balance,
            trading_days,
            trade_count: ledger.len(),
            round_trips: ledger.iter().filter(|t| t.action.is_closing()).count(),
        })
    }
}

pub fn total_return_pct(initial_balance: f64, final_balance: f64) -> f64 {
    (final_balance / initial_balance - 1.0) * 100.0
}

/// Compound `total_return_pct` over `trading_days` to a 365-day rate.
/// Callers must reject `trading_days == 0`.
pub fn annualized_return_pct(total_return_pct: f64, trading_days: i64) -> f64 {
    ((1.0 + total_return_pct / 100.0).powf(DAYS_PER_YEAR / trading_days as f64) - 1.0) * 100.0
}
