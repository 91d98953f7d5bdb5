//! Pluggable signal strategies.

use super::error::AlgoTraderError;
use super::ohlcv::PriceSeries;
use super::signal::{generate_signals, validate_windows, SignalSeries};

/// A rule that turns a price series into long/flat signals and the position
/// deltas between them.
pub trait SignalStrategy {
    fn name(&self) -> String;

    fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries, AlgoTraderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl SmaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, AlgoTraderError> {
        validate_windows(short_window, long_window)?;
        Ok(Self {
            short_window,
            long_window,
        })
    }
}

impl SignalStrategy for SmaCrossover {
    fn name(&self) -> String {
        format!("SMA Crossover ({}/{})", self.short_window, self.long_window)
    }

    fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries, AlgoTraderError> {
        generate_signals(prices, self.short_window, self.long_window)
    }
}
