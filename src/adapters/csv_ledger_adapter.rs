//! CSV trade ledger writer.

use crate::domain::error::TradesimError;
use crate::domain::ledger::TradeRecord;
use crate::ports::ledger_port::LedgerPort;
use std::path::Path;
use tracing::info;

pub const LEDGER_HEADER: [&str; 8] = [
    "Date",
    "Symbol",
    "Action",
    "Price",
    "Shares",
    "Transaction Amount",
    "Gain/Loss",
    "Balance",
];

#[derive(Debug, Default)]
pub struct CsvLedgerAdapter;

impl CsvLedgerAdapter {
    pub fn new() -> Self {
        Self
    }

    fn ledger_error(path: &str, e: impl std::fmt::Display) -> TradesimError {
        TradesimError::Ledger {
            reason: format!("{}: {}", path, e),
        }
    }
}

impl LedgerPort for CsvLedgerAdapter {
    fn write_ledger(&self, ledger: &[TradeRecord], output_path: &str) -> Result<(), TradesimError> {
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut wtr =
            csv::Writer::from_path(output_path).map_err(|e| Self::ledger_error(output_path, e))?;
        wtr.write_record(LEDGER_HEADER)
            .map_err(|e| Self::ledger_error(output_path, e))?;

        for trade in ledger {
            wtr.write_record([
                trade.date.format("%Y-%m-%d").to_string(),
                trade.symbol.clone(),
                trade.action.to_string(),
                format!("{:.2}", trade.price),
                trade.shares.to_string(),
                format!("{:.2}", trade.transaction_amount),
                format!("{:.2}", trade.realized_gain_loss),
                format!("{:.2}", trade.balance_after),
            ])
            .map_err(|e| Self::ledger_error(output_path, e))?;
        }

        wtr.flush()?;
        info!(path = output_path, trades = ledger.len(), "wrote trade ledger");
        Ok(())
    }
}
