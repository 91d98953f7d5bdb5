//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), computed over whatever trailing samples
//! exist when fewer than n are available and `min_periods` allows it.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

/// Trailing mean of `values` over at most `window` samples.
///
/// Returns None at positions with fewer than `min_periods` samples. A window
/// holding identical samples yields that sample exactly, so equal inputs
/// compare equal regardless of window length.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let min_periods = min_periods.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            if slice.len() < min_periods {
                return None;
            }
            let first = slice[0];
            if slice.iter().all(|&v| v == first) {
                return Some(first);
            }
            Some(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

/// Strict SMA over closing prices: the first `period - 1` points are invalid.
pub fn calculate_sma(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    let closes = prices.closes();
    let means = rolling_mean(&closes, period, period);

    let values = prices
        .bars()
        .iter()
        .zip(means)
        .map(|(bar, mean)| IndicatorPoint {
            date: bar.date,
            valid: mean.is_some(),
            value: mean.unwrap_or(f64::NAN),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn rolling_mean_partial_windows() {
        let means = rolling_mean(&[10.0, 20.0, 30.0, 40.0], 3, 1);
        assert_eq!(means, vec![Some(10.0), Some(15.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn rolling_mean_min_periods() {
        let means = rolling_mean(&[10.0, 20.0, 30.0, 40.0], 3, 3);
        assert_eq!(means, vec![None, None, Some(20.0), Some(30.0)]);
    }

    #[test]
    fn rolling_mean_constant_window_is_exact() {
        let v = 10.1;
        let means = rolling_mean(&[v; 7], 7, 1);
        assert!(means.iter().all(|m| *m == Some(v)));

        let short = rolling_mean(&[v; 7], 3, 1);
        assert_eq!(short, means);
    }

    #[test]
    fn rolling_mean_empty() {
        assert!(rolling_mean(&[], 5, 1).is_empty());
    }

    #[test]
    fn sma_warmup() {
        let series = calculate_sma(&make_series(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[0].value.is_nan());
        assert!(series.values[2].valid);
        assert!((series.values[2].value - 20.0).abs() < f64::EPSILON);
        assert!((series.values[4].value - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_longer_than_series() {
        let series = calculate_sma(&make_series(&[10.0, 20.0]), 5);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_carries_dates() {
        let prices = make_series(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&prices, 2);
        let dates: Vec<_> = series.values.iter().map(|p| p.date).collect();
        assert_eq!(dates, prices.dates());
    }
}
