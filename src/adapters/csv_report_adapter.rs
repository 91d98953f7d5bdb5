//! CSV report adapter implementing ReportPort.
//!
//! Writes the equity curve and the trade log as two CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgoTraderError;
use crate::ports::report_port::ReportPort;

pub const EQUITY_FILE: &str = "equity_curve.csv";
pub const TRADES_FILE: &str = "trades.csv";

pub struct CsvReportAdapter;

fn report_error(path: &Path, e: impl std::fmt::Display) -> AlgoTraderError {
    AlgoTraderError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn write_equity_curve(result: &BacktestResult, path: &Path) -> Result<(), AlgoTraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;
    wtr.write_record(["date", "shares_held", "cash", "holdings", "total", "returns"])
        .map_err(|e| report_error(path, e))?;

    for p in &result.portfolio.points {
        let returns = p.period_return.map(|r| r.to_string()).unwrap_or_default();
        wtr.write_record([
            p.date.to_string(),
            p.shares_held.to_string(),
            p.cash.to_string(),
            p.holdings_value.to_string(),
            p.total_equity.to_string(),
            returns,
        ])
        .map_err(|e| report_error(path, e))?;
    }
    wtr.flush().map_err(|e| report_error(path, e))
}

fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), AlgoTraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;
    wtr.write_record(["date", "direction", "shares", "price"])
        .map_err(|e| report_error(path, e))?;

    for t in &result.trades {
        wtr.write_record([
            t.date.to_string(),
            t.direction.to_string(),
            t.traded_shares.to_string(),
            t.fill_price.to_string(),
        ])
        .map_err(|e| report_error(path, e))?;
    }
    wtr.flush().map_err(|e| report_error(path, e))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, AlgoTraderError> {
        fs::create_dir_all(output_dir).map_err(|e| report_error(output_dir, e))?;

        let equity_path = output_dir.join(EQUITY_FILE);
        let trades_path = output_dir.join(TRADES_FILE);
        write_equity_curve(result, &equity_path)?;
        write_trades(result, &trades_path)?;

        info!(dir = %output_dir.display(), "report written");
        Ok(vec![equity_path, trades_path])
    }
}
