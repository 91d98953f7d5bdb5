//! Exponential Moving Average.
//!
//! k = 2/(span+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). No warm-up: every point is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;

pub fn calculate_ema(prices: &PriceSeries, span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: Vec::new(),
        };
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut ema: Option<f64> = None;

    for bar in prices.bars() {
        let next = match ema {
            None => bar.close,
            Some(prev) => bar.close * k + prev * (1.0 - k),
        };
        ema = Some(next);
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: next,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}
