//! Fill simulation against the account.
//!
//! Entries buy as many whole shares as cash allows at the close; exits sell
//! the whole holding at the close. No fees or slippage.

use super::portfolio::Account;

/// How realized gain/loss is reported on closing trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainAccounting {
    /// Always zero. Keeps the classic trade log column shape; carries no
    /// economic meaning.
    #[default]
    Zero,
    /// Proceeds minus the cost basis of the shares sold.
    CostBasis,
}

impl GainAccounting {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "zero" => Some(GainAccounting::Zero),
            "cost_basis" => Some(GainAccounting::CostBasis),
            _ => None,
        }
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { shares: u64, price: f64, cost: f64 },
    /// Cash does not cover a single share; nothing changed.
    InsufficientFunds,
}

/// Spend all available cash on whole shares at `price`.
pub fn enter_long(account: &mut Account, price: f64) -> EntryResult {
    let mut shares = (account.cash / price).floor() as u64;

    // Division can round up to the next integer; never overdraw.
    if shares > 0 && shares as f64 * price > account.cash {
        shares -= 1;
    }

    if shares == 0 {
        return EntryResult::InsufficientFunds;
    }

    let cost = shares as f64 * price;
    account.cash -= cost;
    account.shares += shares;
    account.cost_basis += cost;

    EntryResult::Entered {
        shares,
        price,
        cost,
    }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub shares: u64,
    pub price: f64,
    pub proceeds: f64,
    pub realized_gain_loss: f64,
}

/// Sell the whole holding at `price`. Returns `None` when already flat.
pub fn exit_long(account: &mut Account, price: f64, accounting: GainAccounting) -> Option<ExitResult> {
    if !account.is_holding() {
        return None;
    }

    let shares = account.shares;
    let proceeds = shares as f64 * price;
    let realized_gain_loss = match accounting {
        GainAccounting::Zero => 0.0,
        GainAccounting::CostBasis => proceeds - account.cost_basis,
    };

    account.cash += proceeds;
    account.shares = 0;
    account.cost_basis = 0.0;

    Some(ExitResult {
        shares,
        price,
        proceeds,
        realized_gain_loss,
    })
}
