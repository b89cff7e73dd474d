//! Single-instrument trading account.

/// Cash plus a whole-share long holding. Created fresh for every run and
/// mutated only by the execution functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub initial_balance: f64,
    pub shares: u64,
    /// Total paid for the shares currently held.
    pub cost_basis: f64,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Account {
            cash: initial_balance,
            initial_balance,
            shares: 0,
            cost_basis: 0.0,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.shares > 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    /// Cash plus the holding marked at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.market_value(price)
    }

    /// Average price paid per held share, zero when flat.
    pub fn average_entry_price(&self) -> f64 {
        if self.shares == 0 {
            0.0
        } else {
            self.cost_basis / self.shares as f64
        }
    }
}
