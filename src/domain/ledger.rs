//! Trade ledger records.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
    /// Forced liquidation at the last available close.
    SellEod,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::SellEod => "SELL_EOD",
        }
    }

    pub fn is_closing(self) -> bool {
        !matches!(self, TradeAction::Buy)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executed trade, appended in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: TradeAction,
    pub price: f64,
    pub shares: u64,
    pub transaction_amount: f64,
    pub realized_gain_loss: f64,
    pub balance_after: f64,
}
