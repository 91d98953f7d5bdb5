//! Backtest orchestration: signals, then portfolio, then metrics.
//!
//! Each run is a pure function of the price series and configuration; nothing
//! is cached between calls.

use tracing::info;

use super::error::AlgoTraderError;
use super::metrics::BacktestMetrics;
use super::ohlcv::PriceSeries;
use super::portfolio::{simulate_portfolio, validate_capital, PortfolioTrace};
use super::signal::{validate_windows, SignalSeries};
use super::strategy::{SignalStrategy, SmaCrossover};
use super::trade::TradeLog;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_SHORT_WINDOW: usize = 10;
pub const DEFAULT_LONG_WINDOW: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), AlgoTraderError> {
        validate_windows(self.short_window, self.long_window)?;
        validate_capital(self.initial_capital)
    }

    pub fn strategy(&self) -> Result<SmaCrossover, AlgoTraderError> {
        SmaCrossover::new(self.short_window, self.long_window)
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub signals: SignalSeries,
    pub portfolio: PortfolioTrace,
    pub trades: TradeLog,
    pub metrics: BacktestMetrics,
}

pub fn run_backtest(
    prices: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, AlgoTraderError> {
    config.validate()?;
    let strategy = config.strategy()?;
    run_with_strategy(prices, &strategy, config.initial_capital)
}

pub fn run_with_strategy(
    prices: &PriceSeries,
    strategy: &dyn SignalStrategy,
    initial_capital: f64,
) -> Result<BacktestResult, AlgoTraderError> {
    validate_capital(initial_capital)?;

    let signals = strategy.generate(prices)?;
    let (portfolio, trades) = simulate_portfolio(prices, &signals, initial_capital)?;
    let metrics = BacktestMetrics::compute(&portfolio, &trades);

    info!(
        strategy = %strategy.name(),
        bars = prices.len(),
        trades = trades.len(),
        final_equity = metrics.final_equity,
        "backtest complete"
    );

    Ok(BacktestResult {
        strategy_name: strategy.name(),
        signals,
        portfolio,
        trades,
        metrics,
    })
}
