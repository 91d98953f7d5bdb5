//! Descriptive statistics per OHLCV column.

use std::fmt;

use super::error::AlgoTraderError;
use super::metrics::{mean, sample_std};
use super::ohlcv::{OhlcvBar, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    fn extract(self, bar: &OhlcvBar) -> f64 {
        match self {
            Column::Open => bar.open,
            Column::High => bar.high,
            Column::Low => bar.low,
            Column::Close => bar.close,
            Column::Volume => bar.volume,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::Volume => "Volume",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

pub fn describe(prices: &PriceSeries) -> Result<Vec<ColumnSummary>, AlgoTraderError> {
    if prices.is_empty() {
        return Err(AlgoTraderError::InsufficientData {
            rows: 0,
            minimum: 1,
        });
    }

    let summaries = Column::ALL
        .iter()
        .map(|&column| {
            let mut values: Vec<f64> = prices.bars().iter().map(|b| column.extract(b)).collect();
            values.sort_by(f64::total_cmp);
            ColumnSummary {
                column,
                count: values.len(),
                mean: mean(&values),
                std: sample_std(&values),
                min: values[0],
                p25: quantile(&values, 0.25),
                p50: quantile(&values, 0.50),
                p75: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect();
    Ok(summaries)
}

/// Linear-interpolation quantile of sorted, non-empty `values`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
