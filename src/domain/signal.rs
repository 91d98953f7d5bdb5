//! Moving-average crossover signal generation.
//!
//! For each bar the strategy is long (1.0) when the short rolling mean of
//! closes is strictly above the long one, flat (0.0) otherwise. Bars before
//! index `short_window` are frozen flat. Position deltas mark the flips; the
//! first delta is taken against an implicit flat position before the series.

use chrono::NaiveDate;
use tracing::debug;

use super::error::AlgoTraderError;
use super::indicator::sma::rolling_mean;
use super::ohlcv::PriceSeries;

pub const FLAT: f64 = 0.0;
pub const LONG: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub short_avg: f64,
    pub long_avg: f64,
    pub signal: f64,
    pub position_delta: f64,
}

impl SignalPoint {
    pub fn is_order(&self) -> bool {
        self.position_delta != 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub short_window: usize,
    pub long_window: usize,
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Points where the position changes.
    pub fn orders(&self) -> impl Iterator<Item = &SignalPoint> {
        self.points.iter().filter(|p| p.is_order())
    }
}

pub fn validate_windows(short_window: usize, long_window: usize) -> Result<(), AlgoTraderError> {
    if short_window < 1 || long_window < 1 {
        return Err(AlgoTraderError::invalid_config(format!(
            "windows must be at least 1 (short={short_window}, long={long_window})"
        )));
    }
    if short_window >= long_window {
        return Err(AlgoTraderError::invalid_config(format!(
            "short_window ({short_window}) must be less than long_window ({long_window})"
        )));
    }
    Ok(())
}

pub fn generate_signals(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<SignalSeries, AlgoTraderError> {
    validate_windows(short_window, long_window)?;
    if prices.is_empty() {
        return Err(AlgoTraderError::InsufficientData {
            rows: 0,
            minimum: 1,
        });
    }

    let closes = prices.closes();
    let short_avgs = rolling_mean(&closes, short_window, 1);
    let long_avgs = rolling_mean(&closes, long_window, 1);

    let mut points = Vec::with_capacity(prices.len());
    let mut prev_signal = FLAT;

    for (t, bar) in prices.bars().iter().enumerate() {
        // min_periods = 1 defines every average from the first bar on.
        let short_avg = short_avgs[t].unwrap_or(f64::NAN);
        let long_avg = long_avgs[t].unwrap_or(f64::NAN);

        let signal = if t >= short_window && short_avg > long_avg {
            LONG
        } else {
            FLAT
        };

        points.push(SignalPoint {
            date: bar.date,
            short_avg,
            long_avg,
            signal,
            position_delta: signal - prev_signal,
        });
        prev_signal = signal;
    }

    let series = SignalSeries {
        short_window,
        long_window,
        points,
    };
    debug!(
        short_window,
        long_window,
        bars = series.len(),
        orders = series.orders().count(),
        "generated crossover signals"
    );
    Ok(series)
}
