//! Parameter sweeps over short/long window pairs.
//!
//! Every (short, long) pair is an independent backtest, so pairs are
//! evaluated in parallel with rayon. Output order is (short, long) ascending.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use tracing::info;

use super::backtest::{run_backtest, BacktestConfig};
use super::error::AlgoTraderError;
use super::metrics::BacktestMetrics;
use super::ohlcv::PriceSeries;

pub const DEFAULT_SHORT_RANGE: (usize, usize) = (5, 50);
pub const DEFAULT_LONG_RANGE: (usize, usize) = (20, 100);

#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub short_windows: RangeInclusive<usize>,
    pub long_windows: RangeInclusive<usize>,
    pub initial_capital: f64,
}

impl SweepGrid {
    /// Valid window pairs, i.e. those with short < long.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.short_windows
            .clone()
            .filter(|&s| s >= 1)
            .flat_map(|s| {
                self.long_windows
                    .clone()
                    .filter(move |&l| l > s)
                    .map(move |l| (s, l))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub short_window: usize,
    pub long_window: usize,
    pub metrics: BacktestMetrics,
}

impl SweepOutcome {
    /// Outcome with the highest finite Sharpe ratio.
    pub fn best_by_sharpe(outcomes: &[SweepOutcome]) -> Option<&SweepOutcome> {
        outcomes
            .iter()
            .filter(|o| o.metrics.annualized_sharpe.is_finite())
            .max_by(|a, b| {
                a.metrics
                    .annualized_sharpe
                    .total_cmp(&b.metrics.annualized_sharpe)
            })
    }
}

pub fn run_sweep(
    prices: &PriceSeries,
    grid: &SweepGrid,
) -> Result<Vec<SweepOutcome>, AlgoTraderError> {
    let pairs = grid.pairs();
    if pairs.is_empty() {
        return Err(AlgoTraderError::invalid_config(format!(
            "sweep grid short {:?} / long {:?} has no pair with short < long",
            grid.short_windows, grid.long_windows
        )));
    }

    info!(pairs = pairs.len(), bars = prices.len(), "running parameter sweep");

    pairs
        .into_par_iter()
        .map(|(short_window, long_window)| {
            let config = BacktestConfig {
                short_window,
                long_window,
                initial_capital: grid.initial_capital,
            };
            run_backtest(prices, &config).map(|result| SweepOutcome {
                short_window,
                long_window,
                metrics: result.metrics,
            })
        })
        .collect()
}
