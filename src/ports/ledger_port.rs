//! Trade ledger output port trait.

use crate::domain::error::TradesimError;
use crate::domain::ledger::TradeRecord;

/// Port for persisting the trade ledger of a run.
pub trait LedgerPort {
    fn write_ledger(&self, ledger: &[TradeRecord], output_path: &str) -> Result<(), TradesimError>;
}
