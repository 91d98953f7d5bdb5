//! Portfolio simulation: cash plus a single position, driven by signal deltas.
//!
//! Every non-zero position delta trades `SHARES_PER_TRADE` shares per unit
//! at the same bar's close. There are no commissions, no slippage and no
//! margin checks, so cash may go negative when capital is insufficient.

use chrono::NaiveDate;
use tracing::debug;

use super::error::AlgoTraderError;
use super::ohlcv::PriceSeries;
use super::signal::{SignalSeries, FLAT, LONG};
use super::trade::{TradeDirection, TradeLog, TradeRecord};

pub const SHARES_PER_TRADE: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub date: NaiveDate,
    pub shares_held: i64,
    pub cash: f64,
    pub holdings_value: f64,
    pub total_equity: f64,
    /// None on the first bar.
    pub period_return: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioTrace {
    pub initial_capital: f64,
    pub points: Vec<PortfolioState>,
}

impl PortfolioTrace {
    pub fn final_equity(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.total_equity)
            .unwrap_or(self.initial_capital)
    }

    /// Defined period returns, i.e. every bar but the first.
    pub fn period_returns(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.period_return).collect()
    }

    pub fn equity_curve(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.total_equity)).collect()
    }
}

pub fn validate_capital(initial_capital: f64) -> Result<(), AlgoTraderError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(AlgoTraderError::invalid_config(format!(
            "initial_capital must be positive, got {initial_capital}"
        )));
    }
    Ok(())
}

fn check_alignment(prices: &PriceSeries, signals: &SignalSeries) -> Result<(), AlgoTraderError> {
    if prices.len() != signals.len() {
        return Err(AlgoTraderError::IndexMismatch {
            reason: format!(
                "{} price rows but {} signal rows",
                prices.len(),
                signals.len()
            ),
        });
    }
    let misaligned = prices
        .bars()
        .iter()
        .zip(&signals.points)
        .enumerate()
        .find(|(_, (bar, point))| bar.date != point.date);
    if let Some((i, (bar, point))) = misaligned {
        return Err(AlgoTraderError::IndexMismatch {
            reason: format!(
                "row {i}: price dated {} but signal dated {}",
                bar.date, point.date
            ),
        });
    }
    Ok(())
}

/// Signals must be flat or long, and each delta must be the step from the
/// previous signal (flat before the first bar).
fn check_signals(signals: &SignalSeries) -> Result<(), AlgoTraderError> {
    let mut prev_signal = FLAT;
    for (index, point) in signals.points.iter().enumerate() {
        if point.signal != FLAT && point.signal != LONG {
            return Err(AlgoTraderError::InvalidSignal {
                index,
                reason: format!("signal {} is neither flat (0) nor long (1)", point.signal),
            });
        }
        if point.position_delta != point.signal - prev_signal {
            return Err(AlgoTraderError::InvalidSignal {
                index,
                reason: format!(
                    "position_delta {} does not match signal change {} -> {}",
                    point.position_delta, prev_signal, point.signal
                ),
            });
        }
        prev_signal = point.signal;
    }
    Ok(())
}

pub fn simulate_portfolio(
    prices: &PriceSeries,
    signals: &SignalSeries,
    initial_capital: f64,
) -> Result<(PortfolioTrace, TradeLog), AlgoTraderError> {
    validate_capital(initial_capital)?;
    if prices.is_empty() {
        return Err(AlgoTraderError::InsufficientData {
            rows: 0,
            minimum: 1,
        });
    }
    check_alignment(prices, signals)?;
    check_signals(signals)?;

    let mut points = Vec::with_capacity(prices.len());
    let mut trades = TradeLog::new();
    let mut shares_held: i64 = 0;
    let mut cash = initial_capital;
    let mut prev_equity: Option<f64> = None;

    for (bar, point) in prices.bars().iter().zip(&signals.points) {
        // check_signals restricts deltas to -1.0, 0.0 or 1.0.
        let traded_shares = SHARES_PER_TRADE * point.position_delta as i64;

        shares_held += traded_shares;
        cash -= traded_shares as f64 * bar.close;
        let holdings_value = shares_held as f64 * bar.close;
        let total_equity = cash + holdings_value;
        let period_return = prev_equity.map(|prev| (total_equity - prev) / prev);

        if let Some(direction) = TradeDirection::from_shares(traded_shares) {
            trades.push(TradeRecord {
                date: bar.date,
                direction,
                traded_shares,
                fill_price: bar.close,
            });
        }

        points.push(PortfolioState {
            date: bar.date,
            shares_held,
            cash,
            holdings_value,
            total_equity,
            period_return,
        });
        prev_equity = Some(total_equity);
    }

    debug!(
        bars = points.len(),
        trades = trades.len(),
        initial_capital,
        "simulated portfolio"
    );

    Ok((
        PortfolioTrace {
            initial_capital,
            points,
        },
        trades,
    ))
}
